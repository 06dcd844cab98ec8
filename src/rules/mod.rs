//! Termination policies.
//!
//! Boards call into an `EndCondition` once per tick but never interpret
//! winning themselves. Built-in policies:
//! - `LastUnicornStanding` (default)
//! - `Timeout`
//! - `NoEnd`
//!
//! Policies that cannot be rebuilt from a snapshot come back as `Frozen`.

pub mod end_condition;

pub use end_condition::{
    BoardSummary, EndCondition, EndConditionState, Frozen, LastUnicornStanding, NoEnd, Timeout,
};
