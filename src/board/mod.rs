//! Board variants and the contract they share.
//!
//! Three representations implement `Board` with identical observable
//! behavior:
//!
//! - `CanonicalBoard`: one `Vec` per entity type, cell queries scan them.
//!   The reference implementation.
//! - `IndexedBoard`: the same collections plus a per-cell occupancy table
//!   for O(1) cell queries.
//! - `PackedBoard`: geometry and binary occupancy packed into `u64` bit grids,
//!   timers kept in persistent vectors.
//!
//! Boards compare equal (also across variants) iff their `BoardState`
//! snapshots are equal.
//!
//! ## Copies
//!
//! `copy` shares the immutable geometry with the source; `deep_copy` does
//! not. Both give the copy its own entity collections and end condition.
//! Boards deliberately do not implement `Clone`.
//!
//! ## Example
//!
//! ```
//! use unicorn_board::{Board, CanonicalBoard, Move};
//!
//! let mut board = CanonicalBoard::from_level_rows(&["#####", "#p..#", "#####"]).unwrap();
//! assert!(board.execute_move(Move::Spawn));
//! assert!(!board.execute_move(Move::Spawn)); // a seed already sits here
//! assert!(board.execute_move(Move::Right));
//! assert_eq!(board.seeds().len(), 1);
//! ```

mod bits;
mod canonical;
mod codec;
mod driver;
mod indexed;
mod packed;
pub mod state;

use std::path::Path;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use bits::BitGrid;
pub use canonical::CanonicalBoard;
pub use indexed::IndexedBoard;
pub use packed::{PackedBoard, PackedGeometry};
pub use state::{BoardState, TurnState};

use crate::core::{BoardConfig, Cloud, Entity, Marker, Move, MoveSet, PlayerId, Position, Rainbow, Seed, Tile, Unicorn};
use crate::error::Result;
use crate::level::{render_rows, Level};
use crate::rules::EndCondition;

/// Which representation wrote a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BoardKind {
    Canonical = 0,
    Indexed = 1,
    Packed = 2,
}

impl BoardKind {
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(BoardKind::Canonical),
            1 => Some(BoardKind::Indexed),
            2 => Some(BoardKind::Packed),
            _ => None,
        }
    }
}

impl std::fmt::Display for BoardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BoardKind::Canonical => "canonical",
            BoardKind::Indexed => "indexed",
            BoardKind::Packed => "packed",
        };
        f.write_str(name)
    }
}

/// Entities on one cell, terrain first.
pub type CellStack = SmallVec<[Entity; 6]>;

/// The board contract.
///
/// ## Implementation Notes
///
/// - `execute_move` validates before mutating: a `false` return leaves the
///   board unchanged.
/// - Every successful move advances exactly one tick.
/// - `snapshot` must capture everything equality depends on.
pub trait Board: std::fmt::Debug + Send {
    /// Representation tag written into snapshots.
    const KIND: BoardKind;

    // === Construction ===

    /// Build a board from a validated state.
    fn from_state(state: BoardState) -> Result<Self>
    where
        Self: Sized;

    /// Capture the complete state of this board.
    fn snapshot(&self) -> BoardState;

    /// Build the initial board for a parsed level.
    fn from_level(level: &Level, config: BoardConfig) -> Result<Self>
    where
        Self: Sized,
    {
        Self::from_state(BoardState::from_level(level, config))
    }

    /// Parse level rows under the default configuration.
    fn from_level_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self>
    where
        Self: Sized,
    {
        Self::from_level(&Level::parse(rows)?, BoardConfig::default())
    }

    /// Read a level file under the default configuration.
    fn from_level_file(path: impl AsRef<Path>) -> Result<Self>
    where
        Self: Sized,
    {
        Self::from_level(&Level::from_file(path)?, BoardConfig::default())
    }

    /// Current geometry and static entities in level format.
    ///
    /// Seed fuses and rainbows are not representable and are dropped.
    fn to_level_rows(&self) -> Vec<String> {
        let state = self.snapshot();
        render_rows(&state.geometry, &state.unicorns, &state.clouds, &state.markers)
    }

    // === Persistence ===

    fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::encode(Self::KIND, &self.snapshot())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        Self::from_state(codec::decode(Self::KIND, bytes)?)
    }

    fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        codec::write_file(path.as_ref(), Self::KIND, &self.snapshot())
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self>
    where
        Self: Sized,
    {
        Self::from_state(codec::read_file(path.as_ref(), Self::KIND)?)
    }

    // === Copies ===

    /// Copy sharing the immutable geometry.
    fn copy(&self) -> Self
    where
        Self: Sized;

    /// Fully independent copy.
    fn deep_copy(&self) -> Self
    where
        Self: Sized;

    /// True if both boards hold the same geometry allocation.
    fn shares_geometry_with(&self, other: &Self) -> bool
    where
        Self: Sized;

    // === Play ===

    /// Apply `mv` for the active player and advance one tick.
    ///
    /// Returns false, without touching the board, if the move is illegal or
    /// the game is over.
    fn execute_move(&mut self, mv: Move) -> bool;

    /// Moves `execute_move` would accept right now.
    fn possible_moves(&self) -> MoveSet;

    // === Cell queries ===

    /// Everything on `pos`, in stacking order.
    fn at(&self, pos: Position) -> CellStack;

    /// A path cell no unicorn, seed or cloud blocks.
    fn is_passable(&self, pos: Position) -> bool;

    /// The cell holds something a detonation clears on contact.
    fn is_removable(&self, pos: Position) -> bool;

    // === End condition ===

    fn set_end_condition(&mut self, policy: Box<dyn EndCondition>);

    fn is_running(&self) -> bool;

    fn winner(&self) -> Option<PlayerId>;

    fn outcome(&self) -> String;

    // === Accessors ===

    fn config(&self) -> &BoardConfig;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn tile(&self, pos: Position) -> Tile;

    /// Ticks completed.
    fn tick(&self) -> u64;

    /// Index of the unicorn whose move is next.
    fn active_index(&self) -> usize;

    fn active_player(&self) -> Option<PlayerId> {
        self.unicorns().get(self.active_index()).map(|u| u.player)
    }

    fn current_unicorn(&self) -> Option<&Unicorn> {
        self.unicorns().get(self.active_index())
    }

    /// All unicorns, dead or alive, indexed by player.
    fn unicorns(&self) -> &[Unicorn];

    fn seeds(&self) -> Vec<Seed>;

    fn clouds(&self) -> Vec<Cloud>;

    fn rainbows(&self) -> Vec<Rainbow>;

    fn markers(&self) -> &[Marker];
}

macro_rules! impl_board_eq {
    (@each [$($lhs:ty),+] $rhs:tt) => {
        $(impl_board_eq!(@row $lhs $rhs);)+
    };
    (@row $lhs:ty [$($rhs:ty),+]) => {
        $(
            impl PartialEq<$rhs> for $lhs {
                fn eq(&self, other: &$rhs) -> bool {
                    self.snapshot() == other.snapshot()
                }
            }
        )+
    };
    ($($lhs:ty),+) => {
        impl_board_eq!(@each [$($lhs),+] [$($lhs),+]);
    };
}

impl_board_eq!(CanonicalBoard, IndexedBoard, PackedBoard);
