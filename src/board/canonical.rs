//! Reference board: one `Vec` per entity type.
//!
//! Cell queries scan the collections. Boards in play hold a handful of
//! entities, so the scans stay short, and the simple layout makes this the
//! variant the others are checked against.

use std::sync::Arc;

use super::driver::{self, Layout};
use super::state::{BoardState, TurnState};
use super::{Board, BoardKind, CellStack};
use crate::core::{BoardConfig, Cloud, Entity, Geometry, Marker, Move, MoveSet, PlayerId, Position, Rainbow, Seed, Tile, Unicorn};
use crate::error::Result;
use crate::rules::EndCondition;

#[derive(Debug)]
pub struct CanonicalBoard {
    geometry: Arc<Geometry>,
    config: BoardConfig,
    unicorns: Vec<Unicorn>,
    seeds: Vec<Seed>,
    /// Row-major.
    clouds: Vec<Cloud>,
    rainbows: Vec<Rainbow>,
    markers: Vec<Marker>,
    turn: TurnState,
    end_condition: Box<dyn EndCondition>,
}

impl CanonicalBoard {
    fn duplicate(&self, geometry: Arc<Geometry>) -> Self {
        Self {
            geometry,
            config: self.config,
            unicorns: self.unicorns.clone(),
            seeds: self.seeds.clone(),
            clouds: self.clouds.clone(),
            rainbows: self.rainbows.clone(),
            markers: self.markers.clone(),
            turn: self.turn,
            end_condition: self.end_condition.copy(),
        }
    }

    fn unicorn_at(&self, pos: Position) -> Option<&Unicorn> {
        self.unicorns.iter().find(|u| u.alive && u.pos == pos)
    }
}

impl Layout for CanonicalBoard {
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
        self.unicorn_at(pos).is_some() || self.has_seed(pos) || self.has_cloud(pos)
    }

    fn has_seed(&self, pos: Position) -> bool {
        self.seeds.iter().any(|s| s.pos == pos)
    }

    fn has_cloud(&self, pos: Position) -> bool {
        self.clouds.iter().any(|c| c.pos == pos)
    }

    fn has_rainbow(&self, pos: Position) -> bool {
        self.rainbows.iter().any(|r| r.pos == pos)
    }

    fn move_unicorn(&mut self, player: usize, to: Position) {
        self.unicorns[player].pos = to;
    }

    fn set_seed_count(&mut self, player: usize, seeds: u8) {
        self.unicorns[player].seeds = seeds;
    }

    fn sail(&mut self, player: usize) {
        self.unicorns[player].alive = false;
    }

    fn plant(&mut self, seed: Seed) {
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
        detonated
    }

    fn evaporate(&mut self, pos: Position) -> Option<Cloud> {
        let index = self.clouds.iter().position(|c| c.pos == pos)?;
        Some(self.clouds.remove(index))
    }

    fn place_rainbow(&mut self, rainbow: Rainbow) {
        match self.rainbows.iter_mut().find(|r| r.pos == rainbow.pos) {
            Some(existing) => existing.refresh(&rainbow),
            None => self.rainbows.push(rainbow),
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
        faded
    }
}

impl Board for CanonicalBoard {
    const KIND: BoardKind = BoardKind::Canonical;

    fn from_state(state: BoardState) -> Result<Self> {
        let state = state.checked()?;
        Ok(Self {
            geometry: Arc::new(state.geometry),
            config: state.config,
            unicorns: state.unicorns,
            seeds: state.seeds,
            clouds: state.clouds,
            rainbows: state.rainbows,
            markers: state.markers,
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
        stack.extend(self.unicorn_at(pos).copied().map(Entity::Unicorn));
        stack.extend(self.seeds.iter().find(|s| s.pos == pos).copied().map(Entity::Seed));
        stack.extend(self.clouds.iter().find(|c| c.pos == pos).copied().map(Entity::Cloud));
        stack.extend(self.rainbows.iter().find(|r| r.pos == pos).copied().map(Entity::Rainbow));
        stack.extend(self.markers.iter().find(|m| m.pos == pos).copied().map(Entity::Marker));
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
