//! Bit-packed board.
//!
//! Geometry and binary occupancy live in `BitGrid`s, one bit per cell per
//! property. Passability of a cell is a single word expression,
//! `path & !(unicorns | seeds | clouds)`, and sailing detection is the
//! word-wise AND of the unicorn and rainbow grids.
//!
//! Clouds carry no data beyond their position, so they exist only as bits.
//! Seeds and rainbows need their timers and are kept in `im::Vector`s, which
//! makes `copy` cheap for tree search: the copy shares structure with the
//! source until one of them changes.

use std::sync::Arc;

use im::Vector;

use super::bits::BitGrid;
use super::driver::{self, Layout};
use super::state::{BoardState, TurnState};
use super::{Board, BoardKind, CellStack};
use crate::core::{BoardConfig, Cloud, Entity, Geometry, Marker, Move, MoveSet, PlayerId, Position, Rainbow, Seed, Tile, Unicorn};
use crate::error::Result;
use crate::rules::EndCondition;

/// Terrain as two bit grids.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackedGeometry {
    walls: BitGrid,
    paths: BitGrid,
}

impl PackedGeometry {
    #[must_use]
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let (width, height) = (geometry.width(), geometry.height());
        Self {
            walls: BitGrid::from_cells(width, height, geometry.cells_of(Tile::Wall)),
            paths: BitGrid::from_cells(width, height, geometry.cells_of(Tile::Path)),
        }
    }

    #[must_use]
    pub fn to_geometry(&self) -> Geometry {
        let (width, height) = (self.width(), self.height());
        let tiles = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
            .map(|pos| self.tile(pos))
            .collect();
        Geometry::from_tiles(width, height, tiles)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.paths.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.paths.height()
    }

    #[must_use]
    pub fn tile(&self, pos: Position) -> Tile {
        if self.paths.get(pos) {
            Tile::Path
        } else if self.walls.get(pos) {
            Tile::Wall
        } else {
            Tile::Blank
        }
    }

    #[must_use]
    pub fn paths(&self) -> &BitGrid {
        &self.paths
    }

    #[must_use]
    pub fn walls(&self) -> &BitGrid {
        &self.walls
    }
}

#[derive(Debug)]
pub struct PackedBoard {
    geometry: Arc<PackedGeometry>,
    config: BoardConfig,
    unicorns: Vec<Unicorn>,
    markers: Vec<Marker>,
    seeds: Vector<Seed>,
    rainbows: Vector<Rainbow>,
    // Living unicorns only.
    unicorn_bits: BitGrid,
    seed_bits: BitGrid,
    cloud_bits: BitGrid,
    rainbow_bits: BitGrid,
    turn: TurnState,
    end_condition: Box<dyn EndCondition>,
}

impl PackedBoard {
    fn duplicate(&self, geometry: Arc<PackedGeometry>) -> Self {
        Self {
            geometry,
            config: self.config,
            unicorns: self.unicorns.clone(),
            markers: self.markers.clone(),
            seeds: self.seeds.clone(),
            rainbows: self.rainbows.clone(),
            unicorn_bits: self.unicorn_bits.clone(),
            seed_bits: self.seed_bits.clone(),
            cloud_bits: self.cloud_bits.clone(),
            rainbow_bits: self.rainbow_bits.clone(),
            turn: self.turn,
            end_condition: self.end_condition.copy(),
        }
    }

    /// Cells a unicorn could step onto right now.
    #[must_use]
    pub fn passable_mask(&self) -> BitGrid {
        let blocked = self.unicorn_bits.or(&self.seed_bits).or(&self.cloud_bits);
        self.geometry.paths().and_not(&blocked)
    }

    /// The packed terrain, shared with copies.
    #[must_use]
    pub fn packed_geometry(&self) -> &PackedGeometry {
        &self.geometry
    }
}

impl Layout for PackedBoard {
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
        self.cloud_bits.count()
    }

    fn end_condition_mut(&mut self) -> &mut dyn EndCondition {
        self.end_condition.as_mut()
    }

    fn is_blocked(&self, pos: Position) -> bool {
        self.unicorn_bits.get(pos) || self.seed_bits.get(pos) || self.cloud_bits.get(pos)
    }

    fn has_seed(&self, pos: Position) -> bool {
        self.seed_bits.get(pos)
    }

    fn has_cloud(&self, pos: Position) -> bool {
        self.cloud_bits.get(pos)
    }

    fn has_rainbow(&self, pos: Position) -> bool {
        self.rainbow_bits.get(pos)
    }

    fn is_passable(&self, pos: Position) -> bool {
        let Some((w, b)) = self.geometry.paths().locate(pos) else {
            return false;
        };
        let blocked = self.unicorn_bits.word(w) | self.seed_bits.word(w) | self.cloud_bits.word(w);
        (self.geometry.paths().word(w) & !blocked) >> b & 1 == 1
    }

    fn carries_blast(&self, pos: Position) -> bool {
        let Some((w, b)) = self.geometry.paths().locate(pos) else {
            return false;
        };
        (self.geometry.paths().word(w) & !self.cloud_bits.word(w)) >> b & 1 == 1
    }

    fn covered_unicorns(&self) -> smallvec::SmallVec<[usize; 4]> {
        let covered = self.unicorn_bits.and(&self.rainbow_bits);
        if covered.is_empty() {
            return smallvec::SmallVec::new();
        }
        self.unicorns
            .iter()
            .enumerate()
            .filter(|(_, u)| u.alive && covered.get(u.pos))
            .map(|(i, _)| i)
            .collect()
    }

    fn move_unicorn(&mut self, player: usize, to: Position) {
        self.unicorn_bits.clear(self.unicorns[player].pos);
        self.unicorns[player].pos = to;
        self.unicorn_bits.set(to);
    }

    fn set_seed_count(&mut self, player: usize, seeds: u8) {
        self.unicorns[player].seeds = seeds;
    }

    fn sail(&mut self, player: usize) {
        self.unicorns[player].alive = false;
        self.unicorn_bits.clear(self.unicorns[player].pos);
    }

    fn plant(&mut self, seed: Seed) {
        self.seed_bits.set(seed.pos);
        self.seeds.push_back(seed);
    }

    fn burn_fuses(&mut self) -> Vec<Seed> {
        for seed in self.seeds.iter_mut() {
            seed.fuse = seed.fuse.saturating_sub(1);
        }
        let detonated: Vec<Seed> = self.seeds.iter().filter(|s| s.fuse == 0).copied().collect();
        if !detonated.is_empty() {
            self.seeds.retain(|s| s.fuse > 0);
            for seed in &detonated {
                self.seed_bits.clear(seed.pos);
            }
        }
        detonated
    }

    fn evaporate(&mut self, pos: Position) -> Option<Cloud> {
        if !self.cloud_bits.get(pos) {
            return None;
        }
        self.cloud_bits.clear(pos);
        Some(Cloud::new(pos))
    }

    fn place_rainbow(&mut self, rainbow: Rainbow) {
        if self.rainbow_bits.get(rainbow.pos) {
            if let Some(existing) = self.rainbows.iter_mut().find(|r| r.pos == rainbow.pos) {
                existing.refresh(&rainbow);
            }
            return;
        }
        self.rainbow_bits.set(rainbow.pos);
        self.rainbows.push_back(rainbow);
    }

    fn fade_rainbows(&mut self) -> Vec<Rainbow> {
        for rainbow in self.rainbows.iter_mut() {
            rainbow.duration = rainbow.duration.saturating_sub(1);
        }
        let faded: Vec<Rainbow> = self.rainbows.iter().filter(|r| r.duration == 0).copied().collect();
        if !faded.is_empty() {
            self.rainbows.retain(|r| r.duration > 0);
            for rainbow in &faded {
                self.rainbow_bits.clear(rainbow.pos);
            }
        }
        faded
    }
}

impl Board for PackedBoard {
    const KIND: BoardKind = BoardKind::Packed;

    fn from_state(state: BoardState) -> Result<Self> {
        let state = state.checked()?;
        let (width, height) = (state.geometry.width(), state.geometry.height());
        let living = state.unicorns.iter().filter(|u| u.alive).map(|u| u.pos);

        Ok(Self {
            geometry: Arc::new(PackedGeometry::from_geometry(&state.geometry)),
            config: state.config,
            unicorn_bits: BitGrid::from_cells(width, height, living),
            seed_bits: BitGrid::from_cells(width, height, state.seeds.iter().map(|s| s.pos)),
            cloud_bits: BitGrid::from_cells(width, height, state.clouds.iter().map(|c| c.pos)),
            rainbow_bits: BitGrid::from_cells(width, height, state.rainbows.iter().map(|r| r.pos)),
            unicorns: state.unicorns,
            markers: state.markers,
            seeds: state.seeds.into_iter().collect(),
            rainbows: state.rainbows.into_iter().collect(),
            turn: state.turn,
            end_condition: state.end_condition.restore(),
        })
    }

    fn snapshot(&self) -> BoardState {
        BoardState {
            geometry: self.geometry.to_geometry(),
            config: self.config,
            unicorns: self.unicorns.clone(),
            seeds: self.seeds(),
            clouds: self.clouds(),
            rainbows: self.rainbows(),
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
        if self.unicorn_bits.get(pos) {
            stack.extend(self.unicorns.iter().find(|u| u.alive && u.pos == pos).copied().map(Entity::Unicorn));
        }
        if self.seed_bits.get(pos) {
            stack.extend(self.seeds.iter().find(|s| s.pos == pos).copied().map(Entity::Seed));
        }
        if self.cloud_bits.get(pos) {
            stack.push(Entity::Cloud(Cloud::new(pos)));
        }
        if self.rainbow_bits.get(pos) {
            stack.extend(self.rainbows.iter().find(|r| r.pos == pos).copied().map(Entity::Rainbow));
        }
        stack.extend(self.markers.iter().find(|m| m.pos == pos).copied().map(Entity::Marker));
        stack
    }

    fn is_passable(&self, pos: Position) -> bool {
        Layout::is_passable(self, pos)
    }

    fn is_removable(&self, pos: Position) -> bool {
        self.cloud_bits.get(pos)
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
        self.seeds.iter().copied().collect()
    }

    fn clouds(&self) -> Vec<Cloud> {
        self.cloud_bits.iter_ones().map(Cloud::new).collect()
    }

    fn rainbows(&self) -> Vec<Rainbow> {
        self.rainbows.iter().copied().collect()
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

#[cfg(test)]
mod tests {
    use super::{PackedBoard, PackedGeometry};
    use crate::board::driver::Layout;
    use crate::board::{Board, CanonicalBoard};
    use crate::core::{Move, Position, Tile};
    use crate::level::Level;

    #[test]
    fn test_packed_geometry_round_trip() {
        let level = Level::parse(&["#########", "#p.. ..c#", "# ##### #", "#########"]).unwrap();
        let packed = PackedGeometry::from_geometry(&level.geometry);

        assert_eq!(packed.to_geometry(), level.geometry);
        assert_eq!(packed.tile(Position::new(4, 1)), Tile::Blank);
        assert_eq!(packed.tile(Position::new(0, 0)), Tile::Wall);
        assert_eq!(packed.tile(Position::new(-1, 0)), Tile::Blank);
    }

    #[test]
    fn test_passable_mask_matches_cell_queries() {
        let mut b = PackedBoard::from_level_rows(&["######", "#pc.p#", "#.. .#", "######"]).unwrap();
        b.execute_move(Move::Spawn);

        let mask = b.passable_mask();
        for y in 0..b.height() as i32 {
            for x in 0..b.width() as i32 {
                let pos = Position::new(x, y);
                assert_eq!(mask.get(pos), Board::is_passable(&b, pos), "{pos}");
            }
        }
        assert!(!Board::is_passable(&b, Position::new(1, 1)));
        assert!(Board::is_passable(&b, Position::new(3, 1)));
    }

    #[test]
    fn test_blast_mask_matches_terrain_and_clouds() {
        let b = PackedBoard::from_level_rows(&["#######", "#pc. c#", "#.#c..#", "#######"]).unwrap();

        for y in -1..=b.height() as i32 {
            for x in -1..=b.width() as i32 {
                let pos = Position::new(x, y);
                let open = Board::tile(&b, pos) == Tile::Path && !b.is_removable(pos);
                assert_eq!(Layout::carries_blast(&b, pos), open, "{pos}");
            }
        }
        assert!(Layout::carries_blast(&b, Position::new(1, 1)));
        assert!(!Layout::carries_blast(&b, Position::new(2, 1)));
        assert!(!Layout::carries_blast(&b, Position::new(4, 1)));
    }

    #[test]
    fn test_clouds_reported_row_major() {
        let b = PackedBoard::from_level_rows(&["#####", "#c.c#", "#cp.#", "#####"]).unwrap();
        let clouds: Vec<_> = b.clouds().iter().map(|c| c.pos).collect();

        assert_eq!(clouds, vec![Position::new(1, 1), Position::new(3, 1), Position::new(1, 2)]);
    }

    #[test]
    fn test_copy_is_independent() {
        let b = PackedBoard::from_level_rows(&["#####", "#p..#", "#####"]).unwrap();
        let mut copy = b.copy();

        assert!(copy.shares_geometry_with(&b));
        assert!(copy.execute_move(Move::Spawn));
        assert!(b.seeds().is_empty());
        assert_eq!(copy.seeds().len(), 1);
        assert!(!b.deep_copy().shares_geometry_with(&b));
    }

    #[test]
    fn test_matches_canonical_through_a_blast() {
        let rows = ["#######", "#p.c..#", "#.###.#", "#....p#", "#######"];
        let mut packed = PackedBoard::from_level_rows(&rows).unwrap();
        let mut canonical = CanonicalBoard::from_level_rows(&rows).unwrap();

        let script = [Move::Right, Move::Stay, Move::Spawn, Move::Stay, Move::Left, Move::Stay, Move::Down, Move::Stay];
        for mv in script.into_iter().chain(std::iter::repeat(Move::Stay).take(10)) {
            assert_eq!(packed.execute_move(mv), canonical.execute_move(mv), "{mv}");
            assert_eq!(packed, canonical);
        }
        assert!(packed.clouds().is_empty());
        assert!(packed.rainbows().is_empty());
        assert!(Board::unicorns(&packed).iter().all(|u| u.alive));
    }
}
