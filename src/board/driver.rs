//! Move execution and tick advance, shared by every board variant.
//!
//! The variants differ only in how they store state. They expose that
//! storage through `Layout`, a small set of queries and primitive mutations,
//! and this module drives the rules on top of it. Because the rules are
//! written once, the variants cannot drift apart.
//!
//! ## Tick order
//!
//! 1. Burn one unit of every seed fuse.
//! 2. Detonate seeds whose fuse hit zero: footprints for all of them are
//!    computed first, against the clouds present at tick start, then applied.
//! 3. Send unicorns standing on a rainbow sailing, new or ongoing.
//! 4. Fade every rainbow by one; expired credited rainbows return a seed.
//! 5. Consult the end condition.
//! 6. Pass the turn to the next living player.

use smallvec::SmallVec;
use tracing::{debug, info, trace};

use super::state::TurnState;
use crate::core::{BoardConfig, Cloud, Direction, Move, MoveSet, Position, Rainbow, Seed, Tile, Unicorn};
use crate::rules::{BoardSummary, EndCondition};

/// Storage operations the driver needs from a board variant.
///
/// Mutations must keep any auxiliary index consistent before returning.
/// Collections that report an order (seeds, rainbows) must append new
/// entries at the end and preserve the relative order of the rest.
pub(crate) trait Layout {
    fn config(&self) -> &BoardConfig;
    fn tile(&self, pos: Position) -> Tile;
    fn turn(&self) -> &TurnState;
    fn turn_mut(&mut self) -> &mut TurnState;
    fn unicorns(&self) -> &[Unicorn];
    fn cloud_count(&self) -> usize;
    fn end_condition_mut(&mut self) -> &mut dyn EndCondition;

    /// A living unicorn, a seed or a cloud occupies `pos`.
    fn is_blocked(&self, pos: Position) -> bool;
    fn has_seed(&self, pos: Position) -> bool;
    fn has_cloud(&self, pos: Position) -> bool;
    fn has_rainbow(&self, pos: Position) -> bool;

    fn is_passable(&self, pos: Position) -> bool {
        self.tile(pos) == Tile::Path && !self.is_blocked(pos)
    }

    /// A blast can continue through `pos`: a Path cell without a cloud.
    fn carries_blast(&self, pos: Position) -> bool {
        self.tile(pos) == Tile::Path && !self.has_cloud(pos)
    }

    /// Players whose living unicorn stands on a rainbow, ascending.
    fn covered_unicorns(&self) -> SmallVec<[usize; 4]> {
        self.unicorns()
            .iter()
            .enumerate()
            .filter(|(_, u)| u.alive && self.has_rainbow(u.pos))
            .map(|(i, _)| i)
            .collect()
    }

    fn move_unicorn(&mut self, player: usize, to: Position);
    fn set_seed_count(&mut self, player: usize, seeds: u8);
    fn sail(&mut self, player: usize);
    fn plant(&mut self, seed: Seed);

    /// Decrement every fuse; remove and return seeds that reached zero.
    fn burn_fuses(&mut self) -> Vec<Seed>;

    /// Remove the cloud at `pos`, if any.
    fn evaporate(&mut self, pos: Position) -> Option<Cloud>;

    /// Add a rainbow, merging into an existing one on the same cell.
    fn place_rainbow(&mut self, rainbow: Rainbow);

    /// Decrement every duration; remove and return rainbows that reached zero.
    fn fade_rainbows(&mut self) -> Vec<Rainbow>;
}

/// Cells reached by one detonation.
#[derive(Debug, Default)]
struct Blast {
    cells: SmallVec<[Position; 8]>,
    clouds: SmallVec<[Position; 4]>,
}

fn blast_footprint<L: Layout>(board: &L, seed: &Seed) -> Blast {
    let reach = i32::try_from(seed.range).unwrap_or(i32::MAX);
    let mut blast = Blast::default();

    for direction in Direction::ALL {
        for distance in 1..=reach {
            let pos = seed.pos.step(direction, distance);
            if !board.carries_blast(pos) {
                if board.has_cloud(pos) {
                    blast.clouds.push(pos);
                }
                break;
            }
            blast.cells.push(pos);
        }
    }
    blast
}

fn active_unicorn<L: Layout>(board: &L) -> Option<Unicorn> {
    if !board.turn().running {
        return None;
    }
    board.unicorns().get(board.turn().active).copied().filter(|u| u.alive)
}

pub(crate) fn possible_moves<L: Layout>(board: &L) -> MoveSet {
    let mut moves = MoveSet::new();
    let Some(unicorn) = active_unicorn(board) else {
        return moves;
    };

    for mv in Move::ALL {
        match mv.direction() {
            Some(direction) if board.is_passable(unicorn.pos.step(direction, 1)) => moves.insert(mv),
            Some(_) => {}
            None if mv == Move::Spawn => {
                if unicorn.seeds > 0 && !board.has_seed(unicorn.pos) {
                    moves.insert(mv);
                }
            }
            None => moves.insert(mv),
        }
    }
    moves
}

pub(crate) fn execute_move<L: Layout>(board: &mut L, mv: Move) -> bool {
    let Some(unicorn) = active_unicorn(board) else {
        trace!(%mv, "rejected: no active unicorn");
        return false;
    };
    let player = unicorn.player.index();

    match (mv, mv.direction()) {
        (_, Some(direction)) => {
            let to = unicorn.pos.step(direction, 1);
            if !board.is_passable(to) {
                trace!(%mv, player, %to, "rejected: target blocked");
                return false;
            }
            board.move_unicorn(player, to);
        }
        (Move::Spawn, None) => {
            if unicorn.seeds == 0 || board.has_seed(unicorn.pos) {
                trace!(player, seeds = unicorn.seeds, "rejected: cannot spawn");
                return false;
            }
            let config = *board.config();
            board.plant(Seed::new(unicorn.pos, unicorn.player, config.seed_fuse, config.blast_range));
            board.set_seed_count(player, unicorn.seeds - 1);
        }
        _ => {}
    }

    advance(board);
    true
}

fn advance<L: Layout>(board: &mut L) {
    let config = *board.config();

    let detonated = board.burn_fuses();
    let blasts: Vec<Blast> = detonated.iter().map(|seed| blast_footprint(&*board, seed)).collect();
    let mut evaporated = Vec::new();

    for (seed, blast) in detonated.iter().zip(&blasts) {
        debug!(pos = %seed.pos, owner = %seed.owner, cells = blast.cells.len(), "seed detonated");
        board.place_rainbow(Rainbow::credited(seed.pos, config.rainbow_duration, seed.owner));
        for &pos in &blast.cells {
            board.place_rainbow(Rainbow::new(pos, config.rainbow_duration));
        }
    }
    for &pos in blasts.iter().flat_map(|b| b.clouds.iter()) {
        evaporated.extend(board.evaporate(pos));
    }

    // Sail before fading: a rainbow covers on the tick it expires.
    let mut sailing = Vec::new();
    for player in board.covered_unicorns() {
        board.sail(player);
        sailing.push(board.unicorns()[player]);
        debug!(player, "unicorn sent sailing");
    }

    for rainbow in board.fade_rainbows() {
        let Some(owner) = rainbow.credit else { continue };
        if let Some(unicorn) = board.unicorns().get(owner.index()) {
            let seeds = unicorn.seeds.saturating_add(1).min(config.max_seeds);
            board.set_seed_count(owner.index(), seeds);
        }
    }

    board.turn_mut().tick += 1;
    let unicorns = board.unicorns().to_vec();
    let summary = BoardSummary {
        tick: board.turn().tick,
        unicorns: &unicorns,
        clouds_remaining: board.cloud_count(),
    };
    if board.end_condition_mut().has_ended(&summary, &evaporated, &sailing) {
        board.turn_mut().running = false;
        let policy = board.end_condition_mut();
        info!(tick = summary.tick, winner = ?policy.winner(), outcome = %policy.outcome(), "game ended");
    }

    let count = unicorns.len();
    let active = board.turn().active;
    if let Some(next) = (1..=count).map(|offset| (active + offset) % count).find(|&i| unicorns[i].alive) {
        board.turn_mut().active = next;
    }
}
