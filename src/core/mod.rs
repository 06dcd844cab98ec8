//! Core value types: positions, players, moves, entities, geometry and rule
//! configuration.
//!
//! Nothing in this module knows how a board stores its state; the board
//! variants in `crate::board` are all built from these types.

pub mod position;
pub mod player;
pub mod action;
pub mod entity;
pub mod geometry;
pub mod config;

pub use position::{Direction, Position};
pub use player::PlayerId;
pub use action::{Move, MoveSet};
pub use entity::{Cloud, Entity, Marker, Rainbow, Seed, Unicorn};
pub use geometry::{Geometry, Tile};
pub use config::{BoardConfig, DEFAULT_DURATION, DEFAULT_FUSE, DEFAULT_RANGE, MAX_SEEDS};
