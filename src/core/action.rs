//! Moves and move sets.
//!
//! A turn consists of exactly one `Move` by the active player: a step in one
//! of the four directions, staying in place, or spawning a seed on the
//! current cell.
//!
//! `MoveSet` is a compact set of moves backed by a single byte, returned by
//! `Board::possible_moves`. Iteration follows declaration order of `Move`.
//!
//! ```
//! use unicorn_board::core::{Move, MoveSet};
//!
//! let mut moves = MoveSet::new();
//! moves.insert(Move::Stay);
//! moves.insert(Move::Spawn);
//!
//! assert!(moves.contains(Move::Spawn));
//! assert!(!moves.contains(Move::Up));
//! assert_eq!(moves.iter().collect::<Vec<_>>(), vec![Move::Stay, Move::Spawn]);
//! ```

use serde::{Deserialize, Serialize};

use super::position::Direction;

/// A single player move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    Stay,
    Spawn,
}

impl Move {
    /// Every move, in canonical order.
    pub const ALL: [Move; 6] = [Move::Up, Move::Down, Move::Left, Move::Right, Move::Stay, Move::Spawn];

    /// The direction a movement step goes in, `None` for `Stay` and `Spawn`.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Move::Up => Some(Direction::Up),
            Move::Down => Some(Direction::Down),
            Move::Left => Some(Direction::Left),
            Move::Right => Some(Direction::Right),
            Move::Stay | Move::Spawn => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
            Move::Stay => "STAY",
            Move::Spawn => "SPAWN",
        };
        f.write_str(name)
    }
}

/// A set of moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveSet(u8);

impl MoveSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, mv: Move) {
        self.0 |= mv.bit();
    }

    pub fn remove(&mut self, mv: Move) {
        self.0 &= !mv.bit();
    }

    #[must_use]
    pub const fn contains(self, mv: Move) -> bool {
        self.0 & mv.bit() != 0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate in canonical move order.
    pub fn iter(self) -> impl Iterator<Item = Move> {
        Move::ALL.into_iter().filter(move |&mv| self.contains(mv))
    }
}

impl FromIterator<Move> for MoveSet {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut set = MoveSet::new();
        for mv in iter {
            set.insert(mv);
        }
        set
    }
}
