//! Static board geometry.
//!
//! Every cell is a `Wall`, a `Path`, or `Blank` (outside the playable area).
//! Geometry never changes after construction; boards hold it behind an `Arc`
//! so that shallow copies share one allocation.

use serde::{Deserialize, Serialize};

use super::position::Position;

/// Terrain kind of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Path,
    Blank,
}

/// Immutable grid of tiles, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Geometry {
    /// Build a geometry from row-major tiles.
    ///
    /// Returns `None` if `tiles.len() != width * height`.
    #[must_use]
    pub fn new(width: usize, height: usize, tiles: Vec<Tile>) -> Option<Self> {
        (width.checked_mul(height)? == tiles.len()).then_some(Self { width, height, tiles })
    }

    /// Build from tiles whose count is already known to match.
    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self { width, height, tiles }
    }

    /// False for a deserialized geometry whose tile count disagrees with its size.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.width.checked_mul(self.height) == Some(self.tiles.len())
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Check that `pos` lies on the grid.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Row-major cell index, `None` off the grid.
    #[must_use]
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Position of a row-major cell index.
    #[must_use]
    pub fn position_of(&self, index: usize) -> Position {
        Position::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Tile at `pos`; off-grid cells read as `Blank`.
    #[must_use]
    pub fn tile(&self, pos: Position) -> Tile {
        self.index_of(pos).map_or(Tile::Blank, |i| self.tiles[i])
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Iterate over every cell of the given kind in row-major order.
    pub fn cells_of(&self, kind: Tile) -> impl Iterator<Item = Position> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, &t)| t == kind)
            .map(|(i, _)| self.position_of(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Geometry {
        use Tile::*;
        Geometry::new(4, 3, vec![
            Wall, Wall, Wall, Wall,
            Wall, Path, Blank, Wall,
            Wall, Wall, Wall, Wall,
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Geometry::new(2, 2, vec![Tile::Path; 3]).is_none());
        assert!(Geometry::new(2, 2, vec![Tile::Path; 4]).is_some());
    }

    #[test]
    fn test_tile_lookup() {
        let geometry = corridor();

        assert_eq!(geometry.tile(Position::new(1, 1)), Tile::Path);
        assert_eq!(geometry.tile(Position::new(2, 1)), Tile::Blank);
        assert_eq!(geometry.tile(Position::new(0, 0)), Tile::Wall);
        assert_eq!(geometry.tile(Position::new(-1, 0)), Tile::Blank);
        assert_eq!(geometry.tile(Position::new(4, 1)), Tile::Blank);
    }

    #[test]
    fn test_index_round_trip() {
        let geometry = corridor();
        let pos = Position::new(2, 1);

        let index = geometry.index_of(pos).unwrap();
        assert_eq!(index, 6);
        assert_eq!(geometry.position_of(index), pos);
        assert_eq!(geometry.index_of(Position::new(0, 3)), None);
    }

    #[test]
    fn test_cells_of() {
        let geometry = corridor();

        assert_eq!(geometry.cells_of(Tile::Path).collect::<Vec<_>>(), vec![Position::new(1, 1)]);
        assert_eq!(geometry.cells_of(Tile::Wall).count(), 10);
    }
}
