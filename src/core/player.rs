//! Player identification.
//!
//! Players are numbered in the order their unicorns appear in the level
//! (row-major), starting at zero. A board supports at most 256 players.

use serde::{Deserialize, Serialize};

/// Player identifier; one `u8` per unicorn, so up to 256 players.
///
/// Player indices are 0-based: the first unicorn read from a level belongs to
/// `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert a collection index into a player ID.
    ///
    /// Returns `None` past the 256-player limit.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}
