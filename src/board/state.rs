//! Representation-free board state.
//!
//! `BoardState` is the common currency of the three board variants: every
//! variant can produce one (`Board::snapshot`) and be built from one
//! (`Board::from_state`). Board equality, the binary codec and cross-variant
//! conversion are all defined on it.

use serde::{Deserialize, Serialize};

use crate::core::{BoardConfig, Cloud, Geometry, Marker, PlayerId, Position, Rainbow, Seed, Tile, Unicorn};
use crate::error::{BoardError, Result};
use crate::level::Level;
use crate::rules::EndConditionState;

/// Turn bookkeeping shared by all variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnState {
    /// Collection index of the unicorn whose move is next.
    pub active: usize,
    /// Ticks completed so far.
    pub tick: u64,
    /// False once the end condition has ended the game.
    pub running: bool,
}

impl Default for TurnState {
    fn default() -> Self {
        Self { active: 0, tick: 0, running: true }
    }
}

/// Complete, plain-data state of a board.
///
/// Collections keep their simulation order, except clouds, which are always
/// kept in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub geometry: Geometry,
    pub config: BoardConfig,
    /// Unicorn `i` belongs to player `i`.
    pub unicorns: Vec<Unicorn>,
    pub seeds: Vec<Seed>,
    pub clouds: Vec<Cloud>,
    pub rainbows: Vec<Rainbow>,
    pub markers: Vec<Marker>,
    pub turn: TurnState,
    pub end_condition: EndConditionState,
}

impl BoardState {
    /// Initial state for a parsed level under the default end condition.
    ///
    /// `Level::parse` caps a level at 256 unicorns, so every unicorn gets an id.
    #[must_use]
    pub fn from_level(level: &Level, config: BoardConfig) -> Self {
        let unicorns = level
            .unicorns
            .iter()
            .enumerate()
            .filter_map(|(i, &pos)| PlayerId::from_index(i).map(|id| Unicorn::new(pos, id, &config)))
            .collect();

        Self {
            geometry: level.geometry.clone(),
            config,
            unicorns,
            seeds: Vec::new(),
            clouds: level.clouds.clone(),
            rainbows: Vec::new(),
            markers: level.markers.clone(),
            turn: TurnState::default(),
            end_condition: EndConditionState::default(),
        }
    }

    /// Validate the state and bring it into canonical form.
    pub fn checked(mut self) -> Result<Self> {
        self.validate()?;
        self.clouds.sort_by_key(|c| c.pos.row_major());
        Ok(self)
    }

    /// Check the structural invariants every board relies on.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(BoardError::InvalidState(msg));

        if !self.geometry.is_well_formed() {
            return invalid(format!(
                "{}x{} geometry with {} tiles",
                self.geometry.width(),
                self.geometry.height(),
                self.geometry.tiles().len()
            ));
        }
        if !self.config.is_valid() {
            return invalid(format!("unplayable config {:?}", self.config));
        }
        if self.unicorns.len() > u8::MAX as usize + 1 {
            return invalid(format!("{} unicorns exceed the player limit", self.unicorns.len()));
        }
        if self.turn.active >= self.unicorns.len().max(1) {
            return invalid(format!("active player {} out of range", self.turn.active));
        }

        for (i, unicorn) in self.unicorns.iter().enumerate() {
            if unicorn.player.index() != i {
                return invalid(format!("unicorn {i} belongs to {}", unicorn.player));
            }
            if unicorn.seeds > self.config.max_seeds {
                return invalid(format!("{} holds {} seeds", unicorn.player, unicorn.seeds));
            }
        }

        let active_dead = self.unicorns.get(self.turn.active).is_some_and(|u| !u.alive);
        if active_dead && self.unicorns.iter().any(|u| u.alive) {
            return invalid(format!("active player {} is sailing while others are alive", self.turn.active));
        }

        let player_count = self.unicorns.len();
        self.check_cells("unicorn", self.unicorns.iter().filter(|u| u.alive).map(|u| u.pos))?;
        self.check_cells("seed", self.seeds.iter().map(|s| s.pos))?;
        self.check_cells("cloud", self.clouds.iter().map(|c| c.pos))?;
        self.check_cells("rainbow", self.rainbows.iter().map(|r| r.pos))?;
        self.check_cells("marker", self.markers.iter().map(|m| m.pos))?;

        let clouded = |pos: Position| self.clouds.iter().any(|c| c.pos == pos);
        if let Some(unicorn) = self.unicorns.iter().find(|u| u.alive && clouded(u.pos)) {
            return invalid(format!("{} stands on a cloud at {}", unicorn.player, unicorn.pos));
        }
        if let Some(seed) = self.seeds.iter().find(|s| clouded(s.pos)) {
            return invalid(format!("seed at {} sits on a cloud", seed.pos));
        }
        if let Some(seed) = self.seeds.iter().find(|s| s.fuse == 0 || s.owner.index() >= player_count) {
            return invalid(format!("seed at {} has fuse {} and owner {}", seed.pos, seed.fuse, seed.owner));
        }
        if let Some(rainbow) = self.rainbows.iter().find(|r| r.duration == 0) {
            return invalid(format!("expired rainbow at {}", rainbow.pos));
        }
        if let Some(rainbow) = self.rainbows.iter().find(|r| r.credit.is_some_and(|p| p.index() >= player_count)) {
            return invalid(format!("rainbow at {} credits an unknown player", rainbow.pos));
        }
        Ok(())
    }

    /// Every position must be a distinct Path cell.
    fn check_cells(&self, what: &str, positions: impl Iterator<Item = Position>) -> Result<()> {
        let mut seen = rustc_hash::FxHashSet::default();
        for pos in positions {
            if self.geometry.tile(pos) != Tile::Path {
                return Err(BoardError::InvalidState(format!("{what} at {pos} is not on a path")));
            }
            if !seen.insert(pos) {
                return Err(BoardError::InvalidState(format!("two of {what} share {pos}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(rows: &[&str]) -> BoardState {
        BoardState::from_level(&Level::parse(rows).unwrap(), BoardConfig::default())
    }

    #[test]
    fn test_from_level() {
        let s = state(&["######", "#p.cp#", "######"]);

        assert_eq!(s.unicorns.len(), 2);
        assert_eq!(s.unicorns[1].player, PlayerId::new(1));
        assert_eq!(s.unicorns[1].pos, Position::new(4, 1));
        assert_eq!(s.clouds.len(), 1);
        assert!(s.seeds.is_empty());
        assert!(s.turn.running);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_checked_sorts_clouds() {
        let mut s = state(&["#####", "#cpc#", "#c..#", "#####"]);
        s.clouds.reverse();

        let checked = s.checked().unwrap();
        let order: Vec<_> = checked.clouds.iter().map(|c| c.pos).collect();
        assert_eq!(order, vec![Position::new(1, 1), Position::new(3, 1), Position::new(1, 2)]);
    }

    #[test]
    fn test_rejects_stacked_seeds() {
        let mut s = state(&["####", "#p.#", "####"]);
        let pos = Position::new(2, 1);
        s.seeds.push(Seed::new(pos, PlayerId::new(0), 3, 2));
        s.seeds.push(Seed::new(pos, PlayerId::new(0), 4, 2));

        assert!(matches!(s.validate(), Err(BoardError::InvalidState(_))));
    }

    #[test]
    fn test_rejects_entities_off_path() {
        let mut s = state(&["####", "#p.#", "####"]);
        s.rainbows.push(Rainbow::new(Position::new(0, 0), 2));
        assert!(s.validate().is_err());

        let mut s = state(&["####", "#p.#", "####"]);
        s.unicorns[0].player = PlayerId::new(3);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_dead_seed() {
        let mut s = state(&["####", "#p.#", "####"]);
        s.seeds.push(Seed::new(Position::new(2, 1), PlayerId::new(0), 0, 2));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_sailing_active_player() {
        let mut s = state(&["######", "#p..p#", "######"]);
        s.unicorns[0].alive = false;
        assert!(matches!(s.validate(), Err(BoardError::InvalidState(_))));

        // Once nobody is left, the turn has nowhere to go.
        s.unicorns[1].alive = false;
        assert!(s.validate().is_ok());

        let mut s = state(&["######", "#p..p#", "######"]);
        s.unicorns[1].alive = false;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_rejects_cloud_sharing_a_cell() {
        let mut s = state(&["#####", "#pc.#", "#####"]);
        s.clouds.push(Cloud::new(Position::new(1, 1)));
        assert!(s.validate().is_err());

        let mut s = state(&["#####", "#pc.#", "#####"]);
        s.seeds.push(Seed::new(Position::new(2, 1), PlayerId::new(0), 3, 2));
        assert!(s.validate().is_err());

        // A sailing unicorn no longer occupies its cell.
        let mut s = state(&["#####", "#pc.#", "#####"]);
        s.unicorns[0].alive = false;
        s.clouds.push(Cloud::new(Position::new(1, 1)));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_state_json_round_trip() {
        let s = state(&["#######", "#.pcm.#", "#######"]);
        let json = serde_json::to_string(&s).unwrap();
        let deserialized: BoardState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, deserialized);
    }
}
