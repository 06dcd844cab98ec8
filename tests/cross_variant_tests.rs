//! Cross-variant equivalence tests.
//!
//! The three board variants must be indistinguishable: driven by the same
//! moves from the same level they stay equal at every step, agree on every
//! legality decision, and agree on every cell query.

use proptest::prelude::*;

use unicorn_board::{
    Board, BoardConfig, BoardError, BoardKind, CanonicalBoard, IndexedBoard, Level, Move, NoEnd, PackedBoard,
    Position,
};

const LEVELS: [&[&str]; 4] = [
    &["#####", "#p..#", "#.c.#", "#..p#", "#####"],
    &[
        "###########",
        "#p..c.c..p#",
        "#.#.#.#.#.#",
        "#.c..m..c.#",
        "#.#.#.#.#.#",
        "#p..c.c..p#",
        "###########",
    ],
    &["#########", "#p..c...#", "# ##.## #", "#...c..p#", "#########"],
    // Two words of cells per row, so bit lookups cross word boundaries.
    &[
        "##########################################################################",
        "#p.....c.........c..........m.........c...............c.........c.......p#",
        "#.###################################.##################################.#",
        "#p.....c.........c....................c...............c.........c.......p#",
        "##########################################################################",
    ],
];

struct Trio {
    canonical: CanonicalBoard,
    indexed: IndexedBoard,
    packed: PackedBoard,
}

impl Trio {
    fn new(rows: &[&str], config: BoardConfig) -> Self {
        let level = Level::parse(rows).unwrap();
        Self {
            canonical: CanonicalBoard::from_level(&level, config).unwrap(),
            indexed: IndexedBoard::from_level(&level, config).unwrap(),
            packed: PackedBoard::from_level(&level, config).unwrap(),
        }
    }

    fn execute(&mut self, mv: Move) -> bool {
        let moves = self.canonical.possible_moves();
        assert_eq!(moves, self.indexed.possible_moves());
        assert_eq!(moves, self.packed.possible_moves());

        let accepted = self.canonical.execute_move(mv);
        assert_eq!(accepted, self.indexed.execute_move(mv), "indexed disagrees on {mv}");
        assert_eq!(accepted, self.packed.execute_move(mv), "packed disagrees on {mv}");
        assert_eq!(accepted, moves.contains(mv), "possible_moves disagrees on {mv}");
        accepted
    }

    fn assert_equal(&self) {
        assert!(self.canonical == self.indexed);
        assert!(self.canonical == self.packed);
        assert!(self.indexed == self.packed);
    }

    fn assert_cells_agree(&self) {
        let (width, height) = (self.canonical.width() as i32, self.canonical.height() as i32);
        for y in -1..=height {
            for x in -1..=width {
                let pos = Position::new(x, y);
                let at = self.canonical.at(pos);
                assert_eq!(at, self.indexed.at(pos), "at {pos}");
                assert_eq!(at, self.packed.at(pos), "at {pos}");

                let passable = self.canonical.is_passable(pos);
                assert_eq!(passable, self.indexed.is_passable(pos));
                assert_eq!(passable, self.packed.is_passable(pos));
                assert_eq!(self.canonical.is_removable(pos), self.packed.is_removable(pos));
            }
        }
    }
}

fn config_strategy() -> impl Strategy<Value = BoardConfig> {
    (0u8..=4, 1u32..=8, 0u32..=4, 1u32..=5).prop_map(|(seeds, fuse, range, duration)| {
        BoardConfig::default()
            .with_max_seeds(seeds)
            .with_seed_fuse(fuse)
            .with_blast_range(range)
            .with_rainbow_duration(duration)
    })
}

fn moves_strategy() -> impl Strategy<Value = Vec<Move>> {
    prop::collection::vec(prop::sample::select(Move::ALL.to_vec()), 0..150)
}

proptest! {
    #[test]
    fn prop_variants_stay_equal(
        level in 0..LEVELS.len(),
        config in config_strategy(),
        moves in moves_strategy(),
    ) {
        let mut trio = Trio::new(LEVELS[level], config);
        trio.assert_equal();

        for mv in moves {
            trio.execute(mv);
            trio.assert_equal();
        }
        trio.assert_cells_agree();
        prop_assert_eq!(trio.canonical.outcome(), trio.packed.outcome());
        prop_assert_eq!(trio.canonical.winner(), trio.indexed.winner());
    }

    #[test]
    fn prop_bytes_round_trip(
        level in 0..LEVELS.len(),
        moves in moves_strategy(),
    ) {
        let mut trio = Trio::new(LEVELS[level], BoardConfig::default());
        for mv in moves {
            trio.execute(mv);
        }

        let canonical = CanonicalBoard::from_bytes(&trio.canonical.to_bytes().unwrap()).unwrap();
        let indexed = IndexedBoard::from_bytes(&trio.indexed.to_bytes().unwrap()).unwrap();
        let packed = PackedBoard::from_bytes(&trio.packed.to_bytes().unwrap()).unwrap();

        prop_assert!(canonical == trio.canonical);
        prop_assert!(indexed == trio.indexed);
        prop_assert!(packed == trio.packed);
    }

    #[test]
    fn prop_copies_diverge_independently(
        prefix in moves_strategy(),
        suffix in prop::collection::vec(prop::sample::select(Move::ALL.to_vec()), 1..40),
    ) {
        let mut board = PackedBoard::from_level_rows(LEVELS[1]).unwrap();
        board.set_end_condition(Box::new(NoEnd));
        for mv in prefix {
            board.execute_move(mv);
        }

        let before = board.snapshot();
        let mut copy = board.copy();
        let mut deep = board.deep_copy();
        for &mv in &suffix {
            copy.execute_move(mv);
            deep.execute_move(mv);
        }

        prop_assert_eq!(board.snapshot(), before);
        prop_assert!(copy == deep);
        prop_assert!(copy.shares_geometry_with(&board));
        prop_assert!(!deep.shares_geometry_with(&board));
    }
}

#[test]
fn test_snapshot_converts_between_variants() {
    let mut canonical = CanonicalBoard::from_level_rows(LEVELS[1]).unwrap();
    for mv in [Move::Spawn, Move::Left, Move::Down, Move::Right, Move::Stay, Move::Down, Move::Right] {
        canonical.execute_move(mv);
    }

    let mut indexed = IndexedBoard::from_state(canonical.snapshot()).unwrap();
    let mut packed = PackedBoard::from_state(canonical.snapshot()).unwrap();
    assert!(canonical == indexed);
    assert!(packed == canonical);

    for _ in 0..10 {
        canonical.execute_move(Move::Stay);
        indexed.execute_move(Move::Stay);
        packed.execute_move(Move::Stay);
    }
    assert!(indexed == packed);
    assert!(canonical == packed);
}

#[test]
fn test_bytes_only_decode_into_their_writer() {
    let canonical = CanonicalBoard::from_level_rows(LEVELS[0]).unwrap();
    let bytes = canonical.to_bytes().unwrap();

    let err = PackedBoard::from_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        BoardError::KindMismatch { expected: BoardKind::Packed, found: BoardKind::Canonical }
    ));
    assert!(IndexedBoard::from_bytes(&bytes).is_err());
    assert!(CanonicalBoard::from_bytes(&bytes).is_ok());
}

#[test]
fn test_copies_do_not_compare_by_identity() {
    let a = IndexedBoard::from_level_rows(LEVELS[2]).unwrap();
    let b = IndexedBoard::from_level_rows(LEVELS[2]).unwrap();

    assert!(a == b);
    assert!(!a.shares_geometry_with(&b));
}
