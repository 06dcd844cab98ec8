//! # unicorn-board
//!
//! A turn-based grid game engine: unicorns roam a walled arena, plant seeds
//! that detonate into rainbows after a fuse, and are sent sailing when a
//! rainbow covers them.
//!
//! ## Design Principles
//!
//! 1. **One contract, several layouts**: `Board` is implemented by three
//!    storage variants with identical observable behavior. The rules are
//!    written once and driven through each variant's storage.
//!
//! 2. **Snapshots are the truth**: every board converts to and from a plain
//!    `BoardState`. Equality, persistence and conversion between variants
//!    are all defined on snapshots.
//!
//! 3. **Cheap copies for search**: geometry is immutable and shared between
//!    a board and its `copy`; the packed variant keeps its timers in
//!    persistent vectors.
//!
//! ## Modules
//!
//! - `core`: positions, players, moves, entities, geometry, configuration
//! - `level`: text level format
//! - `rules`: end-condition policies
//! - `board`: the `Board` contract, its variants and the binary codec
//! - `error`: error types

pub mod core;
pub mod level;
pub mod rules;
pub mod board;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Direction, Position, PlayerId,
    Move, MoveSet,
    Entity, Unicorn, Seed, Cloud, Rainbow, Marker,
    Geometry, Tile,
    BoardConfig, MAX_SEEDS, DEFAULT_FUSE, DEFAULT_RANGE, DEFAULT_DURATION,
};

pub use crate::level::Level;

pub use crate::rules::{
    BoardSummary, EndCondition, EndConditionState,
    NoEnd, LastUnicornStanding, Timeout, Frozen,
};

pub use crate::board::{
    Board, BoardKind, BoardState, TurnState, CellStack,
    CanonicalBoard, IndexedBoard, PackedBoard, PackedGeometry, BitGrid,
};

pub use crate::error::{BoardError, LevelError, Result};
