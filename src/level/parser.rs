//! Level parsing and rendering.

use std::path::Path;

use crate::core::{Cloud, Geometry, Marker, Position, Tile, Unicorn};
use crate::error::{BoardError, LevelError};

/// A parsed level: geometry plus the entities placed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub geometry: Geometry,
    /// Unicorn start cells; index `i` belongs to player `i`.
    pub unicorns: Vec<Position>,
    pub clouds: Vec<Cloud>,
    pub markers: Vec<Marker>,
}

impl Level {
    /// Parse level rows.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let first = rows.first().ok_or(LevelError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut unicorns = Vec::new();
        let mut clouds = Vec::new();
        let mut markers = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(LevelError::RaggedRow { row, expected: width, found });
            }

            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(col as i32, row as i32);
                let tile = match ch {
                    '#' => Tile::Wall,
                    '.' => Tile::Path,
                    ' ' => Tile::Blank,
                    'p' => {
                        unicorns.push(pos);
                        Tile::Path
                    }
                    'c' => {
                        clouds.push(Cloud::new(pos));
                        Tile::Path
                    }
                    'm' => {
                        markers.push(Marker::new(pos));
                        Tile::Path
                    }
                    ch => return Err(LevelError::UnknownTile { row, col, ch }),
                };
                tiles.push(tile);
            }
        }

        if unicorns.len() > u8::MAX as usize + 1 {
            return Err(LevelError::TooManyPlayers);
        }

        let geometry = Geometry::new(width, rows.len(), tiles).ok_or(LevelError::Empty)?;
        Ok(Self { geometry, unicorns, clouds, markers })
    }

    /// Read and parse a level file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        let text = std::fs::read_to_string(path)?;
        let rows: Vec<&str> = text.lines().collect();
        Ok(Self::parse(&rows)?)
    }
}

/// Render geometry and static entities back into level rows.
///
/// Dead unicorns are omitted. Seeds and rainbows have no level character
/// and are not written.
#[must_use]
pub fn render_rows(geometry: &Geometry, unicorns: &[Unicorn], clouds: &[Cloud], markers: &[Marker]) -> Vec<String> {
    if geometry.width() == 0 {
        return Vec::new();
    }

    let mut grid: Vec<char> = geometry
        .tiles()
        .iter()
        .map(|tile| match tile {
            Tile::Wall => '#',
            Tile::Path => '.',
            Tile::Blank => ' ',
        })
        .collect();

    let mut stamp = |pos: Position, ch: char| {
        if let Some(i) = geometry.index_of(pos) {
            grid[i] = ch;
        }
    };
    for marker in markers {
        stamp(marker.pos, 'm');
    }
    for cloud in clouds {
        stamp(cloud.pos, 'c');
    }
    for unicorn in unicorns.iter().filter(|u| u.alive) {
        stamp(unicorn.pos, 'p');
    }

    grid.chunks(geometry.width()).map(|row| row.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardConfig, PlayerId};

    #[test]
    fn test_parse_all_tiles() {
        let level = Level::parse(&["#####", "#p m#", "#c..#", "#####"]).unwrap();

        assert_eq!(level.geometry.width(), 5);
        assert_eq!(level.geometry.height(), 4);
        assert_eq!(level.geometry.tile(Position::new(1, 1)), Tile::Path);
        assert_eq!(level.geometry.tile(Position::new(2, 1)), Tile::Blank);
        assert_eq!(level.geometry.tile(Position::new(1, 2)), Tile::Path);
        assert_eq!(level.unicorns, vec![Position::new(1, 1)]);
        assert_eq!(level.clouds, vec![Cloud::new(Position::new(1, 2))]);
        assert_eq!(level.markers, vec![Marker::new(Position::new(3, 1))]);
    }

    #[test]
    fn test_players_numbered_row_major() {
        let level = Level::parse(&["#####", "#..p#", "#p..#", "#####"]).unwrap();
        assert_eq!(level.unicorns, vec![Position::new(3, 1), Position::new(1, 2)]);
    }

    #[test]
    fn test_parse_errors() {
        let empty: [&str; 0] = [];
        assert_eq!(Level::parse(&empty), Err(LevelError::Empty));
        assert_eq!(Level::parse(&[""]), Err(LevelError::Empty));
        assert_eq!(
            Level::parse(&["###", "##"]),
            Err(LevelError::RaggedRow { row: 1, expected: 3, found: 2 })
        );
        assert_eq!(
            Level::parse(&["#x#"]),
            Err(LevelError::UnknownTile { row: 0, col: 1, ch: 'x' })
        );
    }

    #[test]
    fn test_render_round_trip() {
        let rows = ["#######", "#.pcm.#", "# p   #", "#######"];
        let level = Level::parse(&rows).unwrap();
        let config = BoardConfig::default();
        let unicorns: Vec<_> = level
            .unicorns
            .iter()
            .enumerate()
            .map(|(i, &pos)| Unicorn::new(pos, PlayerId::new(i as u8), &config))
            .collect();

        let rendered = render_rows(&level.geometry, &unicorns, &level.clouds, &level.markers);
        assert_eq!(rendered, rows);
    }

    #[test]
    fn test_render_skips_dead_unicorns() {
        let level = Level::parse(&["#p#"]).unwrap();
        let mut unicorn = Unicorn::new(level.unicorns[0], PlayerId::new(0), &BoardConfig::default());
        unicorn.alive = false;

        assert_eq!(render_rows(&level.geometry, &[unicorn], &[], &[]), vec!["#.#".to_string()]);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Level::from_file("/definitely/not/here.lvl").unwrap_err();
        assert!(matches!(err, BoardError::Io(_)));
    }
}
