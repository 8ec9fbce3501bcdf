//! Integration tests for calico
//!
//! Whole-game scenarios across the public API: rules on concrete positions,
//! union-find bookkeeping under random play, playouts and search.

use calico::board::{Board, Color, Reason};
use calico::gtp::GtpEngine;
use calico::mcts::{ROOT, SearchConfig, Slot, Tree};
use calico::playout::{PolicyKind, playout, winrate};
use calico::position::{Move, Point, parse_move, str_coord};
use fastrand::Rng;
use proptest::prelude::*;

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn mv(s: &str) -> Move {
    parse_move(s).unwrap()
}

fn pt(s: &str) -> Point {
    mv(s).point().unwrap()
}

/// Play a sequence of moves, alternating colors, starting with Black.
fn setup_position(dim: usize, moves: &[&str]) -> Board {
    let mut board = Board::new(dim);
    for m in moves {
        board.play(mv(m)).unwrap();
    }
    board
}

/// Place stones directly, regardless of turn order. Black stays to move.
fn setpos(dim: usize, black: &[&str], white: &[&str]) -> Board {
    let mut board = Board::new(dim);
    for m in black {
        board.place(mv(m), Color::Black).unwrap();
    }
    for m in white {
        board.place(mv(m), Color::White).unwrap();
    }
    board
}

/// Every group's incremental liberty count matches a fresh flood fill, no
/// group on the board is without liberties, and neighboring stones of one
/// color share a root.
fn assert_consistent(board: &Board) {
    for p in board.points() {
        let Some(color) = board.color(p).filter(|c| c.is_stone()) else {
            assert_eq!(board.liberties(p), None);
            continue;
        };
        let libs = board.liberties(p).unwrap();
        assert_eq!(Some(libs), board.count_liberties(p), "liberties at {p:?}");
        assert!(libs > 0, "group at {p:?} has no liberties");
        for n in board.adjacent(p).into_iter().flatten() {
            if board.color(n) == Some(color) {
                assert_eq!(board.group_root(n), board.group_root(p));
            }
        }
    }
}

fn quick_config(seed: u64, iterations: usize) -> SearchConfig {
    SearchConfig {
        iterations,
        seed: Some(seed),
        ..SearchConfig::default()
    }
}

// =============================================================================
// Coordinates
// =============================================================================

#[test]
fn test_parse_coord_corners() {
    assert_eq!(mv("A1"), Move::at(1, 1));
    assert_eq!(mv("T19"), Move::at(19, 19));
    assert_eq!(mv("a19"), Move::at(1, 19));
    assert_eq!(mv("T1"), Move::at(19, 1));
    assert_eq!(mv("pass"), Move::Pass);
}

#[test]
fn test_str_coord_roundtrip() {
    let board = Board::new(19);
    for m in board.moves() {
        assert_eq!(parse_move(&str_coord(m)), Ok(m));
    }
}

#[test]
fn test_off_board_reported_by_check() {
    let board = Board::new(9);
    let err = board.check(mv("K10"), Color::Black).unwrap_err();
    assert_eq!(err.reason, Reason::OffBoard);
    assert_eq!(err.to_string(), "(K10 black) : position not on board");
}

// =============================================================================
// Basic moves
// =============================================================================

#[test]
fn test_empty_position() {
    let board = Board::new(19);
    assert_eq!(board.player(), Color::Black);
    assert_eq!(board.last_move(), None);
    assert!(board.points().all(|p| board.color(p) == Some(Color::Empty)));
    assert_eq!(board.score().as_array(), [0, 0, 0]);
}

#[test]
fn test_play_two_stones() {
    let board = setup_position(9, &["D4", "F6"]);
    assert_eq!(board.color(pt("D4")), Some(Color::Black));
    assert_eq!(board.color(pt("F6")), Some(Color::White));
    assert_eq!(board.player(), Color::Black);
    assert_eq!(board.last_move(), Some(mv("F6")));
    assert_eq!(board.second_last_move(), Some(mv("D4")));
}

#[test]
fn test_illegal_move_occupied() {
    let mut board = setup_position(9, &["D4"]);
    let err = board.play(mv("D4")).unwrap_err();
    assert_eq!(err.reason, Reason::Occupied);
    assert_eq!(err.player, Color::White);
    // A failed move changes nothing.
    assert_eq!(board.player(), Color::White);
    assert_eq!(board.last_move(), Some(mv("D4")));
}

#[test]
fn test_invalid_player() {
    let board = Board::new(9);
    let err = board.check(mv("D4"), Color::Empty).unwrap_err();
    assert_eq!(err.reason, Reason::InvalidPlayer);
    assert!(!board.check_fast(Move::Pass, Color::Empty));
}

// =============================================================================
// Captures
// =============================================================================

#[test]
fn test_capture_corner() {
    let mut board = setpos(9, &["B1"], &["A1"]);
    assert_eq!(board.liberties(pt("A1")), Some(1));
    assert_eq!(board.place(mv("A2"), Color::Black), Ok(1));
    assert_eq!(board.color(pt("A1")), Some(Color::Empty));
    assert_eq!(board.liberties(pt("B1")), Some(3));
    assert_consistent(&board);
}

#[test]
fn test_capture_group_on_edge() {
    // White C1-D1 under Black B1, E1, C2, D2.
    let mut board = setpos(9, &["B1", "C2", "D2"], &["C1", "D1"]);
    assert_eq!(board.liberties(pt("C1")), Some(1));
    assert_eq!(board.place(mv("E1"), Color::Black), Ok(2));
    assert_eq!(board.color(pt("C1")), Some(Color::Empty));
    assert_eq!(board.color(pt("D1")), Some(Color::Empty));
    assert_consistent(&board);
}

#[test]
fn test_capture_two_groups_at_once() {
    // White B1 and D1 both have C1 as their last liberty.
    let mut board = setpos(5, &["A1", "B2", "D2", "E1"], &["B1", "D1"]);
    assert_eq!(board.liberties(pt("B1")), Some(1));
    assert_eq!(board.liberties(pt("D1")), Some(1));
    assert_eq!(board.place(mv("C1"), Color::Black), Ok(2));
    assert_eq!(board.color(pt("B1")), Some(Color::Empty));
    assert_eq!(board.color(pt("D1")), Some(Color::Empty));
    assert_eq!(board.score().white, 0);
    // More than one stone taken, so no ko.
    assert_eq!(board.ko(), None);
    assert_consistent(&board);
}

#[test]
fn test_capture_restores_liberties_of_every_neighbor() {
    // The lone white stone at C3 touches three separate black stones.
    let mut board = setpos(5, &["B3", "D3", "C4"], &["C3", "B2", "D2"]);
    assert_eq!(board.liberties(pt("C3")), Some(1));
    assert_eq!(board.liberties(pt("B3")), Some(2));
    assert_eq!(board.place(mv("C2"), Color::Black), Ok(1));
    for p in ["B3", "D3", "C4"] {
        assert_eq!(board.liberties(pt(p)), board.count_liberties(pt(p)), "{p}");
    }
    assert_eq!(board.liberties(pt("C4")), Some(4));
    assert_consistent(&board);
}

#[test]
fn test_suicide_rejected() {
    let board = setpos(9, &["A2", "B1"], &[]);
    let err = board.check(mv("A1"), Color::White).unwrap_err();
    assert_eq!(err.reason, Reason::Suicide);
    assert!(!board.check_fast(mv("A1"), Color::White));
    // Black may fill its own eye.
    assert!(board.check(mv("A1"), Color::Black).is_ok());
}

#[test]
fn test_capture_is_not_suicide() {
    // White A1 would have no liberties, but it captures the black stone at A2.
    let board = setpos(9, &["A2", "B1"], &["A3", "B2", "C1"]);
    assert_eq!(board.liberties(pt("A2")), Some(1));
    assert!(board.check(mv("A1"), Color::White).is_ok());
}

// =============================================================================
// Ko
// =============================================================================

#[test]
fn test_ko_scenario() {
    let mut board = setpos(5, &["B1", "A2", "C2"], &["B2", "A3", "C3", "B4"]);
    assert_eq!(board.place(mv("B3"), Color::Black), Ok(1));
    assert_eq!(board.ko(), Some(pt("B3")));

    let err = board.place(mv("B2"), Color::White).unwrap_err();
    assert_eq!(err.reason, Reason::Ko);
    // The fast check ignores ko on purpose.
    assert!(board.check_fast(mv("B2"), Color::White));

    board.place(mv("E5"), Color::White).unwrap();
    board.place(mv("E1"), Color::Black).unwrap();
    assert_eq!(board.place(mv("B2"), Color::White), Ok(1));
    assert_eq!(board.color(pt("B3")), Some(Color::Empty));
    assert_consistent(&board);
}

#[test]
fn test_ko_only_binds_the_opponent() {
    let mut board = setpos(5, &["B1", "A2", "C2"], &["B2", "A3", "C3", "B4"]);
    board.place(mv("B3"), Color::Black).unwrap();
    // Black filling the ko point is legal.
    assert!(board.check(mv("B2"), Color::Black).is_ok());
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_score_counts_adjacent_empty_points() {
    let board = setpos(5, &["A1"], &["E5"]);
    let score = board.score();
    assert_eq!((score.black, score.white), (3, 3));
    assert_eq!(score.winner(), Color::White);

    let board = setpos(5, &["C3", "A1"], &["E5"]);
    assert_eq!(board.score().as_array(), [5, 8, 3]);
    assert_eq!(board.score().winner(), Color::Black);
}

#[test]
fn test_shared_point_counts_for_both() {
    let board = setpos(3, &["A2"], &["C2"]);
    let score = board.score();
    // B2 borders both colors.
    assert_eq!((score.black, score.white), (4, 4));
    assert_eq!(score.net, 0);
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_display_marks_last_move() {
    let board = setup_position(9, &["E5", "C3"]);
    let text = board.to_string();
    assert!(text.contains("[O]"), "{text}");
    assert!(text.starts_with("    A B C D E F G H J"), "{text}");
    assert_eq!(text.lines().count(), 11);
}

#[test]
fn test_display_star_points() {
    let text = Board::new(19).to_string();
    assert_eq!(text.matches('+').count(), 9);
    assert_eq!(Board::new(9).to_string().matches('+').count(), 0);
}

// =============================================================================
// Playouts
// =============================================================================

#[test]
fn test_playouts_leave_consistent_boards() {
    let board = setup_position(7, &["D4", "C3", "E5"]);
    let mut rng = Rng::with_seed(21);
    for mut policy in [PolicyKind::Light, PolicyKind::CachedLight, PolicyKind::Priority] {
        for _ in 0..5 {
            let end = playout(&board, &mut policy, &mut rng);
            assert_consistent(&end);
        }
    }
    assert_eq!(board.to_string(), setup_position(7, &["D4", "C3", "E5"]).to_string());
}

#[test]
fn test_winrate_is_a_fraction() {
    let board = Board::new(5);
    let mut rng = Rng::with_seed(8);
    let black = winrate(&board, Color::Black, 30, &mut PolicyKind::Light, &mut rng);
    assert!((0.0..=1.0).contains(&black));
    assert_eq!((black * 30.0).round() / 30.0, black);
}

// =============================================================================
// UCT search
// =============================================================================

#[test]
fn test_search_statistics() {
    let mut tree = Tree::new(Board::new(5), quick_config(1, 300));
    let mv = tree.search();

    let root = tree.root();
    assert_eq!(root.plays(), 2 + 300);
    // One new node per iteration.
    assert_eq!(tree.node_count(), 301);
    assert!(root.board().check(mv, Color::Black).is_ok());
    for (child_mv, child) in root.children() {
        let node = tree.node(child);
        assert_eq!(node.parent(), Some(ROOT));
        assert_eq!(node.player(), Color::White);
        assert_eq!(node.board().last_move(), Some(child_mv));
        assert!(node.wins() <= node.plays());
        assert!(tree.confidence_bound(child, false) <= node.winrate());
        assert!(tree.confidence_bound(child, true) >= node.winrate());
    }
}

#[test]
fn test_search_captures_chain_in_atari() {
    // Black C1-C4 has a single liberty at C5.
    let mut board = setpos(
        5,
        &["C1", "C2", "C3", "C4"],
        &["B1", "B2", "B3", "B4", "D1", "D2", "D3", "D4"],
    );
    board.set_player(Color::White);
    assert_eq!(board.liberties(pt("C1")), Some(1));

    let captures = (0..5)
        .filter(|&seed| {
            let mut tree = Tree::new(board.clone(), quick_config(seed, 2000));
            tree.search() == mv("C5")
        })
        .count();
    assert!(captures >= 3, "captured in only {captures} of 5 searches");
}

#[test]
fn test_search_marks_occupied_points_illegal() {
    let board = setpos(3, &["B2"], &[]);
    let mut tree = Tree::new(board, quick_config(2, 50));
    tree.search();
    assert_eq!(tree.root().slot(mv("B2")), Some(Slot::Illegal));
}

#[test]
fn test_search_with_every_policy() {
    for policy in [PolicyKind::Light, PolicyKind::CachedLight, PolicyKind::Priority] {
        let mut tree = Tree::with_policy(Board::new(5), quick_config(4, 100), policy);
        let mv = tree.search();
        assert!(Board::new(5).check(mv, Color::Black).is_ok(), "{policy:?}");
    }
}

// =============================================================================
// GTP
// =============================================================================

#[test]
fn test_gtp_game() {
    let mut engine = GtpEngine::new(19, quick_config(3, 40));
    let input = "boardsize 5\nclear_board\nplay black C3\ngenmove white\nshowboard\nfinal_score\nquit\n";
    let mut out = Vec::new();
    engine.run(input.as_bytes(), &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(!out.lines().any(|l| l.starts_with('?')), "{out}");
    assert_eq!(out.lines().filter(|l| l.starts_with('=')).count(), 7, "{out}");
    assert_eq!(engine.board().xdim(), 5);
    assert_eq!(engine.board().player(), Color::Black);
    assert!(engine.board().last_move().is_some());
}

// =============================================================================
// Properties
// =============================================================================

fn arb_moves() -> impl Strategy<Value = Vec<(usize, usize)>> {
    // Coordinate 0 stands for a pass.
    prop::collection::vec((0usize..=7, 1usize..=7), 0..120)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Union-find bookkeeping agrees with flood fill after any legal game.
    #[test]
    fn prop_union_find_matches_flood_fill(moves in arb_moves()) {
        let mut board = Board::new(7);
        for (x, y) in moves {
            let m = if x == 0 { Move::Pass } else { Move::at(x, y) };
            if board.check(m, board.player()).is_ok() {
                board.play(m).unwrap();
            }
        }
        assert_consistent(&board);
    }

    /// Strict legality implies fast legality.
    #[test]
    fn prop_check_implies_check_fast(moves in arb_moves(), x in 1usize..=7, y in 1usize..=7) {
        let mut board = Board::new(7);
        for (mx, my) in moves {
            let m = if mx == 0 { Move::Pass } else { Move::at(mx, my) };
            let _ = board.play(m);
        }
        let probe = Move::at(x, y);
        let player = board.player();
        if board.check(probe, player).is_ok() {
            prop_assert!(board.check_fast(probe, player));
        }
    }

    /// Playouts always end and keep the board consistent.
    #[test]
    fn prop_playout_terminates(seed in any::<u64>()) {
        let board = Board::new(5);
        let mut rng = Rng::with_seed(seed);
        let end = playout(&board, &mut PolicyKind::Light, &mut rng);
        assert_consistent(&end);
        let score = end.score();
        prop_assert_eq!(score.net, score.black as i32 - score.white as i32);
    }
}
