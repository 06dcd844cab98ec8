//! Termination policies.
//!
//! A board owns one `EndCondition` and consults it once per tick, after
//! detonations have been resolved. The policy sees a summary of the board
//! plus the clouds evaporated and the unicorns sent sailing during that tick.
//!
//! ## Implementation Notes
//!
//! - `has_ended` may record state (winner, tick of termination); it is only
//!   called while the board is still running.
//! - `copy` must return an independent policy; boards call it from
//!   `Board::copy` and `Board::deep_copy`.
//! - `state` is what a snapshot stores. Custom policies keep the default,
//!   which records their observed answers as `EndConditionState::Detached`.

use serde::{Deserialize, Serialize};

use crate::core::{Cloud, PlayerId, Unicorn};

/// Read-only view of a board handed to `EndCondition::has_ended`.
#[derive(Clone, Copy, Debug)]
pub struct BoardSummary<'a> {
    /// Ticks completed, including the one being evaluated.
    pub tick: u64,
    /// All unicorns, dead or alive, indexed by player.
    pub unicorns: &'a [Unicorn],
    /// Clouds still on the board.
    pub clouds_remaining: usize,
}

impl BoardSummary<'_> {
    /// Unicorns still in play.
    pub fn living(&self) -> impl Iterator<Item = &Unicorn> {
        self.unicorns.iter().filter(|u| u.alive)
    }

    /// The single living player, if exactly one remains.
    #[must_use]
    pub fn sole_survivor(&self) -> Option<PlayerId> {
        let mut living = self.living();
        match (living.next(), living.next()) {
            (Some(u), None) => Some(u.player),
            _ => None,
        }
    }
}

/// Termination policy trait.
pub trait EndCondition: std::fmt::Debug + Send {
    /// Decide whether the game is over after the current tick.
    fn has_ended(&mut self, board: &BoardSummary<'_>, evaporated: &[Cloud], sailing: &[Unicorn]) -> bool;

    /// The winning player, `None` while running or on a draw.
    fn winner(&self) -> Option<PlayerId>;

    /// Human-readable description of the current outcome.
    fn outcome(&self) -> String;

    /// Independent copy of this policy.
    fn copy(&self) -> Box<dyn EndCondition>;

    /// Serializable form of this policy.
    fn state(&self) -> EndConditionState {
        EndConditionState::Detached {
            winner: self.winner(),
            outcome: self.outcome(),
        }
    }
}

/// Persisted form of an end condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndConditionState {
    NoEnd,
    LastUnicornStanding { ended: bool, winner: Option<PlayerId> },
    Timeout { max_ticks: u64, ended: bool, winner: Option<PlayerId> },
    /// A policy this crate cannot rebuild; only its answers were kept.
    Detached { winner: Option<PlayerId>, outcome: String },
}

impl EndConditionState {
    /// Rebuild a policy from its persisted form.
    #[must_use]
    pub fn restore(&self) -> Box<dyn EndCondition> {
        match self.clone() {
            EndConditionState::NoEnd => Box::new(NoEnd),
            EndConditionState::LastUnicornStanding { ended, winner } => {
                Box::new(LastUnicornStanding { ended, winner })
            }
            EndConditionState::Timeout { max_ticks, ended, winner } => {
                Box::new(Timeout { max_ticks, ended, winner })
            }
            EndConditionState::Detached { winner, outcome } => Box::new(Frozen { winner, outcome }),
        }
    }
}

impl Default for EndConditionState {
    fn default() -> Self {
        LastUnicornStanding::new().state()
    }
}

/// Never ends the game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoEnd;

impl EndCondition for NoEnd {
    fn has_ended(&mut self, _: &BoardSummary<'_>, _: &[Cloud], _: &[Unicorn]) -> bool {
        false
    }

    fn winner(&self) -> Option<PlayerId> {
        None
    }

    fn outcome(&self) -> String {
        "no end".to_string()
    }

    fn copy(&self) -> Box<dyn EndCondition> {
        Box::new(*self)
    }

    fn state(&self) -> EndConditionState {
        EndConditionState::NoEnd
    }
}

/// Ends the game once a sailing leaves at most one unicorn in play.
///
/// The survivor, if any, wins; otherwise the game is a draw. This is the
/// default policy of every board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LastUnicornStanding {
    ended: bool,
    winner: Option<PlayerId>,
}

impl LastUnicornStanding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn describe(ended: bool, winner: Option<PlayerId>) -> String {
    match (ended, winner) {
        (false, _) => "running".to_string(),
        (true, Some(player)) => format!("{player} wins"),
        (true, None) => "draw".to_string(),
    }
}

impl EndCondition for LastUnicornStanding {
    fn has_ended(&mut self, board: &BoardSummary<'_>, _: &[Cloud], sailing: &[Unicorn]) -> bool {
        if !self.ended && !sailing.is_empty() && board.living().count() <= 1 {
            self.ended = true;
            self.winner = board.sole_survivor();
        }
        self.ended
    }

    fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    fn outcome(&self) -> String {
        describe(self.ended, self.winner)
    }

    fn copy(&self) -> Box<dyn EndCondition> {
        Box::new(*self)
    }

    fn state(&self) -> EndConditionState {
        EndConditionState::LastUnicornStanding {
            ended: self.ended,
            winner: self.winner,
        }
    }
}

/// Last unicorn standing, with a hard tick limit.
///
/// At the limit the game ends; a sole survivor still wins, otherwise it is a
/// draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeout {
    max_ticks: u64,
    ended: bool,
    winner: Option<PlayerId>,
}

impl Timeout {
    #[must_use]
    pub fn new(max_ticks: u64) -> Self {
        Self {
            max_ticks,
            ended: false,
            winner: None,
        }
    }

    #[must_use]
    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }
}

impl EndCondition for Timeout {
    fn has_ended(&mut self, board: &BoardSummary<'_>, _: &[Cloud], sailing: &[Unicorn]) -> bool {
        if self.ended {
            return true;
        }
        let last_standing = !sailing.is_empty() && board.living().count() <= 1;
        if last_standing || board.tick >= self.max_ticks {
            self.ended = true;
            self.winner = board.sole_survivor();
        }
        self.ended
    }

    fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    fn outcome(&self) -> String {
        if self.ended && self.winner.is_none() {
            return format!("draw after {} ticks", self.max_ticks);
        }
        describe(self.ended, self.winner)
    }

    fn copy(&self) -> Box<dyn EndCondition> {
        Box::new(*self)
    }

    fn state(&self) -> EndConditionState {
        EndConditionState::Timeout {
            max_ticks: self.max_ticks,
            ended: self.ended,
            winner: self.winner,
        }
    }
}

/// Stand-in for a custom policy restored from a snapshot.
///
/// Reports the winner and outcome observed when the snapshot was taken and
/// never ends the game by itself. Re-attach the real policy with
/// `Board::set_end_condition` to resume play under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frozen {
    winner: Option<PlayerId>,
    outcome: String,
}

impl EndCondition for Frozen {
    fn has_ended(&mut self, _: &BoardSummary<'_>, _: &[Cloud], _: &[Unicorn]) -> bool {
        false
    }

    fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    fn outcome(&self) -> String {
        self.outcome.clone()
    }

    fn copy(&self) -> Box<dyn EndCondition> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardConfig, Position};

    fn unicorns(alive: &[bool]) -> Vec<Unicorn> {
        alive
            .iter()
            .enumerate()
            .map(|(i, &alive)| {
                let mut u = Unicorn::new(Position::new(i as i32, 0), PlayerId::new(i as u8), &BoardConfig::default());
                u.alive = alive;
                u
            })
            .collect()
    }

    fn summary(unicorns: &[Unicorn], tick: u64) -> BoardSummary<'_> {
        BoardSummary { tick, unicorns, clouds_remaining: 0 }
    }

    #[test]
    fn test_no_end_never_ends() {
        let all_dead = unicorns(&[false, false]);
        let mut policy = NoEnd;

        assert!(!policy.has_ended(&summary(&all_dead, 100), &[], &all_dead));
        assert_eq!(policy.winner(), None);
        assert_eq!(policy.state(), EndConditionState::NoEnd);
    }

    #[test]
    fn test_last_standing_needs_a_sailing() {
        // A single-player board starts with one living unicorn.
        let solo = unicorns(&[true]);
        let mut policy = LastUnicornStanding::new();

        assert!(!policy.has_ended(&summary(&solo, 1), &[], &[]));
        assert_eq!(policy.outcome(), "running");
    }

    #[test]
    fn test_last_standing_declares_survivor() {
        let board = unicorns(&[false, true]);
        let mut policy = LastUnicornStanding::new();

        assert!(policy.has_ended(&summary(&board, 9), &[], &board[..1]));
        assert_eq!(policy.winner(), Some(PlayerId::new(1)));
        assert_eq!(policy.outcome(), "Player 1 wins");
    }

    #[test]
    fn test_last_standing_draw() {
        let board = unicorns(&[false, false]);
        let mut policy = LastUnicornStanding::new();

        assert!(policy.has_ended(&summary(&board, 9), &[], &board));
        assert_eq!(policy.winner(), None);
        assert_eq!(policy.outcome(), "draw");
    }

    #[test]
    fn test_timeout_at_limit() {
        let board = unicorns(&[true, true]);
        let mut policy = Timeout::new(5);

        assert!(!policy.has_ended(&summary(&board, 4), &[], &[]));
        assert!(policy.has_ended(&summary(&board, 5), &[], &[]));
        assert_eq!(policy.winner(), None);
        assert_eq!(policy.outcome(), "draw after 5 ticks");
    }

    #[test]
    fn test_state_restores_builtin_policies() {
        let board = unicorns(&[true, false]);
        let mut policy = LastUnicornStanding::new();
        policy.has_ended(&summary(&board, 3), &[], &board[1..]);

        let restored = policy.state().restore();
        assert_eq!(restored.state(), policy.state());
        assert_eq!(restored.winner(), Some(PlayerId::new(0)));

        let timeout = Timeout::new(12);
        assert_eq!(timeout.state().restore().state(), timeout.state());
    }

    #[derive(Debug)]
    struct AlwaysDraw;

    impl EndCondition for AlwaysDraw {
        fn has_ended(&mut self, _: &BoardSummary<'_>, _: &[Cloud], _: &[Unicorn]) -> bool {
            true
        }
        fn winner(&self) -> Option<PlayerId> {
            None
        }
        fn outcome(&self) -> String {
            "TEST".to_string()
        }
        fn copy(&self) -> Box<dyn EndCondition> {
            Box::new(AlwaysDraw)
        }
    }

    #[test]
    fn test_custom_policy_detaches() {
        let state = AlwaysDraw.state();
        assert_eq!(
            state,
            EndConditionState::Detached { winner: None, outcome: "TEST".to_string() }
        );

        let frozen = state.restore();
        assert_eq!(frozen.outcome(), "TEST");
        assert_eq!(frozen.state(), state);
    }

    #[test]
    fn test_state_serialization() {
        let state = Timeout::new(40).state();
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: EndConditionState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
