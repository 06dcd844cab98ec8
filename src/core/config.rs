//! Rule configuration.
//!
//! The engine never hardcodes its timing constants: every board carries a
//! `BoardConfig`, which is serialized with snapshots and compared by board
//! equality. `BoardConfig::default()` reproduces the standard rules.

use serde::{Deserialize, Serialize};

/// Seeds a unicorn can have in play at once.
pub const MAX_SEEDS: u8 = 3;

/// Ticks between planting a seed and its detonation.
pub const DEFAULT_FUSE: u32 = 7;

/// Cells a detonation reaches along each axis.
pub const DEFAULT_RANGE: u32 = 2;

/// Ticks a rainbow stays on the board.
pub const DEFAULT_DURATION: u32 = 3;

/// Rule constants for one board.
///
/// ## Example
///
/// ```
/// use unicorn_board::core::BoardConfig;
///
/// let config = BoardConfig::default().with_blast_range(4).with_max_seeds(1);
/// assert_eq!(config.blast_range, 4);
/// assert_eq!(config.max_seeds, 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Seeds each unicorn starts with and may hold at most.
    pub max_seeds: u8,

    /// Initial fuse of a freshly planted seed.
    pub seed_fuse: u32,

    /// Blast range of a freshly planted seed.
    pub blast_range: u32,

    /// Initial duration of a rainbow.
    pub rainbow_duration: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_seeds: MAX_SEEDS,
            seed_fuse: DEFAULT_FUSE,
            blast_range: DEFAULT_RANGE,
            rainbow_duration: DEFAULT_DURATION,
        }
    }
}

impl BoardConfig {
    #[must_use]
    pub fn with_max_seeds(mut self, max_seeds: u8) -> Self {
        self.max_seeds = max_seeds;
        self
    }

    /// Set the seed fuse. A fuse of zero is treated as one tick.
    #[must_use]
    pub fn with_seed_fuse(mut self, fuse: u32) -> Self {
        self.seed_fuse = fuse.max(1);
        self
    }

    #[must_use]
    pub fn with_blast_range(mut self, range: u32) -> Self {
        self.blast_range = range;
        self
    }

    /// Set the rainbow duration. A duration of zero is treated as one tick.
    #[must_use]
    pub fn with_rainbow_duration(mut self, duration: u32) -> Self {
        self.rainbow_duration = duration.max(1);
        self
    }

    /// Check the constants describe a playable rule set.
    pub(crate) fn is_valid(&self) -> bool {
        self.seed_fuse > 0 && self.rainbow_duration > 0
    }
}
