//! Board with a per-cell occupancy table.
//!
//! Holds the same collections as `CanonicalBoard` plus a side table mapping
//! each occupied cell to the collection index of whatever stands there, so
//! cell queries are O(1) hash lookups instead of scans.
//!
//! ## Invariant
//!
//! `cells` always equals the table `build_cells` would compute from the
//! collections. Every mutation updates both inside the same `&mut self`
//! method; removals that shift collection indices re-index the affected
//! slot before returning. Empty entries are pruned.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::driver::{self, Layout};
use super::state::{BoardState, TurnState};
use super::{Board, BoardKind, CellStack};
use crate::core::{BoardConfig, Cloud, Entity, Geometry, Marker, Move, MoveSet, PlayerId, Position, Rainbow, Seed, Tile, Unicorn};
use crate::error::Result;
use crate::rules::EndCondition;

/// Collection indices of the entities on one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Occupancy {
    unicorn: Option<usize>,
    seed: Option<usize>,
    cloud: Option<usize>,
    rainbow: Option<usize>,
    marker: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Unicorn,
    Seed,
    Cloud,
    Rainbow,
    Marker,
}

impl Occupancy {
    fn slot_mut(&mut self, slot: Slot) -> &mut Option<usize> {
        match slot {
            Slot::Unicorn => &mut self.unicorn,
            Slot::Seed => &mut self.seed,
            Slot::Cloud => &mut self.cloud,
            Slot::Rainbow => &mut self.rainbow,
            Slot::Marker => &mut self.marker,
        }
    }

    fn is_empty(&self) -> bool {
        *self == Occupancy::default()
    }
}

type Cells = FxHashMap<Position, Occupancy>;

fn occupy(cells: &mut Cells, slot: Slot, pos: Position, index: usize) {
    *cells.entry(pos).or_default().slot_mut(slot) = Some(index);
}

fn vacate(cells: &mut Cells, slot: Slot, pos: Position) {
    if let Some(occupancy) = cells.get_mut(&pos) {
        *occupancy.slot_mut(slot) = None;
        if occupancy.is_empty() {
            cells.remove(&pos);
        }
    }
}

/// Rebuild one slot from scratch after its collection shifted.
fn reindex(cells: &mut Cells, slot: Slot, positions: impl Iterator<Item = Position>) {
    for occupancy in cells.values_mut() {
        *occupancy.slot_mut(slot) = None;
    }
    for (index, pos) in positions.enumerate() {
        occupy(cells, slot, pos, index);
    }
    cells.retain(|_, occupancy| !occupancy.is_empty());
}

fn build_cells(
    unicorns: &[Unicorn],
    seeds: &[Seed],
    clouds: &[Cloud],
    rainbows: &[Rainbow],
    markers: &[Marker],
) -> Cells {
    let mut cells = Cells::default();
    for (index, unicorn) in unicorns.iter().enumerate().filter(|(_, u)| u.alive) {
        occupy(&mut cells, Slot::Unicorn, unicorn.pos, index);
    }
    for (index, seed) in seeds.iter().enumerate() {
        occupy(&mut cells, Slot::Seed, seed.pos, index);
    }
    for (index, cloud) in clouds.iter().enumerate() {
        occupy(&mut cells, Slot::Cloud, cloud.pos, index);
    }
    for (index, rainbow) in rainbows.iter().enumerate() {
        occupy(&mut cells, Slot::Rainbow, rainbow.pos, index);
    }
    for (index, marker) in markers.iter().enumerate() {
        occupy(&mut cells, Slot::Marker, marker.pos, index);
    }
    cells
}

#[derive(Debug)]
pub struct IndexedBoard {
    geometry: Arc<Geometry>,
    config: BoardConfig,
    unicorns: Vec<Unicorn>,
    seeds: Vec<Seed>,
    clouds: Vec<Cloud>,
    rainbows: Vec<Rainbow>,
    markers: Vec<Marker>,
    cells: Cells,
    turn: TurnState,
    end_condition: Box<dyn EndCondition>,
}

impl IndexedBoard {
    fn duplicate(&self, geometry: Arc<Geometry>) -> Self {
        Self {
            geometry,
            config: self.config,
            unicorns: self.unicorns.clone(),
            seeds: self.seeds.clone(),
            clouds: self.clouds.clone(),
            rainbows: self.rainbows.clone(),
            markers: self.markers.clone(),
            cells: self.cells.clone(),
            turn: self.turn,
            end_condition: self.end_condition.copy(),
        }
    }

    fn occupancy(&self, pos: Position) -> Occupancy {
        self.cells.get(&pos).copied().unwrap_or_default()
    }

    #[cfg(test)]
    fn assert_index_consistent(&self) {
        let expected = build_cells(&self.unicorns, &self.seeds, &self.clouds, &self.rainbows, &self.markers);
        assert_eq!(self.cells, expected);
    }
}

impl Layout for IndexedBoard {
    fn config(&self) -> &BoardConfig {
        &self.config
    }

    fn tile(&self, pos: Position) -> Tile {
        self.geometry.tile(pos)
    }

    fn turn(&self) -> &TurnState {
        &self.turn
    }

    fn turn_mut(&mut self) -> &mut TurnState {
        &mut self.turn
    }

    fn unicorns(&self) -> &[Unicorn] {
        &self.unicorns
    }

    fn cloud_count(&self) -> usize {
        self.clouds.len()
    }

    fn end_condition_mut(&mut self) -> &mut dyn EndCondition {
        self.end_condition.as_mut()
    }

    fn is_blocked(&self, pos: Position) -> bool {
        let o = self.occupancy(pos);
        o.unicorn.is_some() || o.seed.is_some() || o.cloud.is_some()
    }

    fn has_seed(&self, pos: Position) -> bool {
        self.occupancy(pos).seed.is_some()
    }

    fn has_cloud(&self, pos: Position) -> bool {
        self.occupancy(pos).cloud.is_some()
    }

    fn has_rainbow(&self, pos: Position) -> bool {
        self.occupancy(pos).rainbow.is_some()
    }

    fn move_unicorn(&mut self, player: usize, to: Position) {
        let from = self.unicorns[player].pos;
        vacate(&mut self.cells, Slot::Unicorn, from);
        self.unicorns[player].pos = to;
        occupy(&mut self.cells, Slot::Unicorn, to, player);
    }

    fn set_seed_count(&mut self, player: usize, seeds: u8) {
        self.unicorns[player].seeds = seeds;
    }

    fn sail(&mut self, player: usize) {
        self.unicorns[player].alive = false;
        vacate(&mut self.cells, Slot::Unicorn, self.unicorns[player].pos);
    }

    fn plant(&mut self, seed: Seed) {
        occupy(&mut self.cells, Slot::Seed, seed.pos, self.seeds.len());
        self.seeds.push(seed);
    }

    fn burn_fuses(&mut self) -> Vec<Seed> {
        let mut detonated = Vec::new();
        self.seeds.retain_mut(|seed| {
            seed.fuse = seed.fuse.saturating_sub(1);
            if seed.fuse == 0 {
                detonated.push(*seed);
                return false;
            }
            true
        });
        if !detonated.is_empty() {
            reindex(&mut self.cells, Slot::Seed, self.seeds.iter().map(|s| s.pos));
        }
        detonated
    }

    fn evaporate(&mut self, pos: Position) -> Option<Cloud> {
        let index = self.occupancy(pos).cloud?;
        let cloud = self.clouds.remove(index);
        reindex(&mut self.cells, Slot::Cloud, self.clouds.iter().map(|c| c.pos));
        Some(cloud)
    }

    fn place_rainbow(&mut self, rainbow: Rainbow) {
        match self.occupancy(rainbow.pos).rainbow {
            Some(index) => self.rainbows[index].refresh(&rainbow),
            None => {
                occupy(&mut self.cells, Slot::Rainbow, rainbow.pos, self.rainbows.len());
                self.rainbows.push(rainbow);
            }
        }
    }

    fn fade_rainbows(&mut self) -> Vec<Rainbow> {
        let mut faded = Vec::new();
        self.rainbows.retain_mut(|rainbow| {
            rainbow.duration = rainbow.duration.saturating_sub(1);
            if rainbow.duration == 0 {
                faded.push(*rainbow);
                return false;
            }
            true
        });
        if !faded.is_empty() {
            reindex(&mut self.cells, Slot::Rainbow, self.rainbows.iter().map(|r| r.pos));
        }
        faded
    }
}

impl Board for IndexedBoard {
    const KIND: BoardKind = BoardKind::Indexed;

    fn from_state(state: BoardState) -> Result<Self> {
        let state = state.checked()?;
        let cells = build_cells(&state.unicorns, &state.seeds, &state.clouds, &state.rainbows, &state.markers);
        Ok(Self {
            geometry: Arc::new(state.geometry),
            config: state.config,
            unicorns: state.unicorns,
            seeds: state.seeds,
            clouds: state.clouds,
            rainbows: state.rainbows,
            markers: state.markers,
            cells,
            turn: state.turn,
            end_condition: state.end_condition.restore(),
        })
    }

    fn snapshot(&self) -> BoardState {
        BoardState {
            geometry: (*self.geometry).clone(),
            config: self.config,
            unicorns: self.unicorns.clone(),
            seeds: self.seeds.clone(),
            clouds: self.clouds.clone(),
            rainbows: self.rainbows.clone(),
            markers: self.markers.clone(),
            turn: self.turn,
            end_condition: self.end_condition.state(),
        }
    }

    fn copy(&self) -> Self {
        self.duplicate(Arc::clone(&self.geometry))
    }

    fn deep_copy(&self) -> Self {
        self.duplicate(Arc::new((*self.geometry).clone()))
    }

    fn shares_geometry_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.geometry, &other.geometry)
    }

    fn execute_move(&mut self, mv: Move) -> bool {
        driver::execute_move(self, mv)
    }

    fn possible_moves(&self) -> MoveSet {
        driver::possible_moves(self)
    }

    fn at(&self, pos: Position) -> CellStack {
        let mut stack = CellStack::new();
        match self.geometry.tile(pos) {
            Tile::Wall => stack.push(Entity::Wall(pos)),
            Tile::Path => stack.push(Entity::Path(pos)),
            Tile::Blank => {}
        }
        let o = self.occupancy(pos);
        stack.extend(o.unicorn.map(|i| Entity::Unicorn(self.unicorns[i])));
        stack.extend(o.seed.map(|i| Entity::Seed(self.seeds[i])));
        stack.extend(o.cloud.map(|i| Entity::Cloud(self.clouds[i])));
        stack.extend(o.rainbow.map(|i| Entity::Rainbow(self.rainbows[i])));
        stack.extend(o.marker.map(|i| Entity::Marker(self.markers[i])));
        stack
    }

    fn is_passable(&self, pos: Position) -> bool {
        Layout::is_passable(self, pos)
    }

    fn is_removable(&self, pos: Position) -> bool {
        self.has_cloud(pos)
    }

    fn set_end_condition(&mut self, policy: Box<dyn EndCondition>) {
        self.end_condition = policy;
    }

    fn is_running(&self) -> bool {
        self.turn.running
    }

    fn winner(&self) -> Option<PlayerId> {
        self.end_condition.winner()
    }

    fn outcome(&self) -> String {
        self.end_condition.outcome()
    }

    fn config(&self) -> &BoardConfig {
        &self.config
    }

    fn width(&self) -> usize {
        self.geometry.width()
    }

    fn height(&self) -> usize {
        self.geometry.height()
    }

    fn tile(&self, pos: Position) -> Tile {
        self.geometry.tile(pos)
    }

    fn tick(&self) -> u64 {
        self.turn.tick
    }

    fn active_index(&self) -> usize {
        self.turn.active
    }

    fn unicorns(&self) -> &[Unicorn] {
        &self.unicorns
    }

    fn seeds(&self) -> Vec<Seed> {
        self.seeds.clone()
    }

    fn clouds(&self) -> Vec<Cloud> {
        self.clouds.clone()
    }

    fn rainbows(&self) -> Vec<Rainbow> {
        self.rainbows.clone()
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}
