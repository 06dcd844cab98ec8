//! Error types.
//!
//! Illegal moves are not errors: `Board::execute_move` reports them with
//! `false`. Errors cover construction from malformed input and the byte/file
//! persistence boundary.

use thiserror::Error;

use crate::board::BoardKind;

/// Errors raised while parsing level text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("unknown tile {ch:?} at row {row}, column {col}")]
    UnknownTile { row: usize, col: usize, ch: char },
    #[error("level places more than 256 unicorns")]
    TooManyPlayers,
}

/// Errors raised while building, encoding or decoding a board.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("malformed level: {0}")]
    Level(#[from] LevelError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("not a board snapshot (bad magic)")]
    BadMagic,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u16),
    #[error("snapshot holds a {found} board, expected {expected}")]
    KindMismatch { expected: BoardKind, found: BoardKind },
    #[error("invalid board state: {0}")]
    InvalidState(String),
}

pub type Result<T, E = BoardError> = std::result::Result<T, E>;
