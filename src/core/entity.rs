//! Board entities.
//!
//! Everything that can stand on a cell besides terrain is a small `Copy`
//! value type owning its position:
//!
//! - `Unicorn`: a player's unit, with its remaining seed count
//! - `Seed`: a planted hazard counting down to detonation
//! - `Cloud`: an obstacle that absorbs one blast
//! - `Rainbow`: the temporary effect left by a detonation
//! - `Marker`: static decoration
//!
//! `Entity` wraps all of them, plus the terrain of a cell, for `Board::at`.
//!
//! ## Stacking order
//!
//! `Board::at` lists a cell's contents in a fixed order: terrain, unicorn,
//! seed, cloud, rainbow, marker. `Entity::layer` exposes that order.

use serde::{Deserialize, Serialize};

use super::config::BoardConfig;
use super::player::PlayerId;
use super::position::Position;

/// A player's unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unicorn {
    pub pos: Position,
    pub player: PlayerId,
    /// Seeds still available to plant.
    pub seeds: u8,
    /// False once the unicorn has been sent sailing.
    pub alive: bool,
}

impl Unicorn {
    /// A living unicorn holding its full seed allowance.
    #[must_use]
    pub fn new(pos: Position, player: PlayerId, config: &BoardConfig) -> Self {
        Self {
            pos,
            player,
            seeds: config.max_seeds,
            alive: true,
        }
    }
}

/// A planted seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed {
    pub pos: Position,
    pub owner: PlayerId,
    /// Ticks until detonation.
    pub fuse: u32,
    pub range: u32,
}

impl Seed {
    #[must_use]
    pub const fn new(pos: Position, owner: PlayerId, fuse: u32, range: u32) -> Self {
        Self { pos, owner, fuse, range }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Position,
}

impl Cloud {
    #[must_use]
    pub const fn new(pos: Position) -> Self {
        Self { pos }
    }
}

/// Blast coverage left behind by a detonation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rainbow {
    pub pos: Position,
    /// Ticks until the rainbow fades.
    pub duration: u32,
    /// Player credited with one seed when this rainbow fades.
    ///
    /// Set only on the rainbow that replaces a detonated seed.
    pub credit: Option<PlayerId>,
}

impl Rainbow {
    #[must_use]
    pub const fn new(pos: Position, duration: u32) -> Self {
        Self { pos, duration, credit: None }
    }

    #[must_use]
    pub const fn credited(pos: Position, duration: u32, owner: PlayerId) -> Self {
        Self { pos, duration, credit: Some(owner) }
    }

    /// Merge a newly placed rainbow into this one.
    ///
    /// The duration is refreshed and a credit owner is never dropped.
    pub fn refresh(&mut self, placed: &Rainbow) {
        self.duration = self.duration.max(placed.duration);
        self.credit = self.credit.or(placed.credit);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker {
    pub pos: Position,
    pub owner: Option<PlayerId>,
}

impl Marker {
    #[must_use]
    pub const fn new(pos: Position) -> Self {
        Self { pos, owner: None }
    }

    #[must_use]
    pub const fn owned(pos: Position, owner: PlayerId) -> Self {
        Self { pos, owner: Some(owner) }
    }
}

/// Anything reported by `Board::at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    Wall(Position),
    Path(Position),
    Unicorn(Unicorn),
    Seed(Seed),
    Cloud(Cloud),
    Rainbow(Rainbow),
    Marker(Marker),
}

impl Entity {
    /// The cell this entity occupies.
    #[must_use]
    pub const fn pos(&self) -> Position {
        match self {
            Entity::Wall(pos) | Entity::Path(pos) => *pos,
            Entity::Unicorn(u) => u.pos,
            Entity::Seed(s) => s.pos,
            Entity::Cloud(c) => c.pos,
            Entity::Rainbow(r) => r.pos,
            Entity::Marker(m) => m.pos,
        }
    }

    /// Stacking layer; lower layers are listed first.
    #[must_use]
    pub const fn layer(&self) -> u8 {
        match self {
            Entity::Wall(_) | Entity::Path(_) => 0,
            Entity::Unicorn(_) => 1,
            Entity::Seed(_) => 2,
            Entity::Cloud(_) => 3,
            Entity::Rainbow(_) => 4,
            Entity::Marker(_) => 5,
        }
    }
}
