//! Search tests verifying the engine finds correct moves in tactical and
//! terminal positions.

use corvus::board::Board;
use corvus::eval::{self, EvalConfig};
use corvus::fen::parse_fen;
use corvus::search::Searcher;
use corvus::time_control::{SearchLimit, TimeManager};
use corvus::tt::TranspositionTable;
use std::time::{Duration, Instant};

fn search_fen(fen: &str, depth: u32) -> corvus::search::SearchOutcome {
    let pos = parse_fen(fen).expect("valid fen");
    let mut board = Board::from_position(pos);
    let mut tt = TranspositionTable::new(8);
    let cfg = EvalConfig::default();
    let time = TimeManager::new(SearchLimit::FixedDepth(depth), Instant::now());
    let mut searcher = Searcher::new(&mut board, &mut tt, &cfg, time);
    searcher.iterative_deepening(depth, |_| {})
}

#[test]
fn finds_mate_in_one_back_rank() {
    let outcome = search_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1", 4);
    assert_eq!(outcome.best_move.to_uci(), "e1e8", "should find Qe8# (back rank mate)");
}

#[test]
fn finds_mate_in_one_queen() {
    let outcome = search_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 0 4", 4);
    assert_eq!(outcome.best_move.to_uci(), "h5f7", "should find Qxf7# (scholar's mate)");
}

#[test]
fn avoids_hanging_the_queen() {
    let outcome = search_fen("r1bqkbnr/pppppppp/2n5/8/4P3/5Q2/PPPP1PPP/RNB1KBNR w KQkq - 0 3", 4);
    assert_ne!(outcome.best_move.to_uci(), "f3c6", "should not hang the queen on c6");
}

#[test]
fn captures_a_free_piece() {
    let fen = "rnbqk1nr/pppp1ppp/2b5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 4";
    let outcome = search_fen(fen, 4);
    let pos = parse_fen(fen).unwrap();
    let mv = pos
        .generate_legal_moves()
        .into_iter()
        .find(|m| m.to_uci() == outcome.best_move.to_uci())
        .expect("best move is legal");
    assert!(mv.is_capture() || outcome.best_move.to_uci() == "c4f7", "should win material or threaten the king");
}

#[test]
fn iterative_deepening_returns_legal_moves_at_every_depth() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    for depth in [2, 4] {
        let outcome = search_fen(fen, depth);
        let pos = parse_fen(fen).unwrap();
        assert!(pos.generate_legal_moves().iter().any(|m| m.to_uci() == outcome.best_move.to_uci()));
    }
}

#[test]
fn single_legal_move_is_found() {
    let outcome = search_fen("8/8/8/8/8/8/8/K6rk w - - 0 1", 4);
    assert_eq!(outcome.best_move.to_uci(), "a1a2", "only legal move should be Ka2");
}

#[test]
fn no_move_in_checkmate() {
    let fen = "rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1";
    let pos = parse_fen(fen).unwrap();
    assert!(pos.is_checkmate(), "position should already be checkmate");
    let outcome = search_fen(fen, 4);
    assert!(outcome.best_move.is_null(), "no legal move should be returned for checkmate");
}

#[test]
fn draw_by_repetition_is_detected() {
    let mut board = Board::new();
    for mv_str in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        let mv = board
            .current()
            .generate_legal_moves()
            .into_iter()
            .find(|m| &m.to_uci() == mv_str)
            .expect("shuffle move should be legal");
        board.make_move(mv);
    }
    assert!(board.is_draw(), "should be a draw by repetition");
}

#[test]
fn evaluation_of_startpos_is_roughly_balanced() {
    let pos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    let cfg = EvalConfig::default();
    let (score, _, _) = eval::evaluate(&pos, &cfg);
    assert!(score.abs() < 50, "starting position should be roughly equal (eval: {})", score);
}

#[test]
fn evaluation_reflects_material_advantage() {
    let cfg = EvalConfig::default();
    let white_up = parse_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    let (eval_white_up, _, _) = eval::evaluate(&white_up, &cfg);
    assert!(eval_white_up > 800, "white up a queen should be very positive (eval: {})", eval_white_up);

    let black_up = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1").unwrap();
    let (eval_black_up, _, _) = eval::evaluate(&black_up, &cfg);
    assert!(eval_black_up < -800, "black up a queen should be very negative (eval: {})", eval_black_up);
}

#[test]
fn search_completes_promptly_at_moderate_depth() {
    let start = Instant::now();
    let outcome = search_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 5);
    let elapsed = start.elapsed();
    assert!(!outcome.best_move.is_null(), "should find a move at depth 5");
    assert!(elapsed < Duration::from_secs(60), "search at depth 5 took too long: {:?}", elapsed);
}

#[test]
fn identifies_stalemate() {
    let pos = parse_fen("k7/8/1QK5/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(pos.is_stalemate(), "position should be stalemate");
    assert!(!pos.is_checkmate(), "position should not be checkmate");
}

#[test]
fn fifty_move_rule_triggers_draw() {
    let pos = parse_fen("8/8/8/8/8/8/8/K1k5 w - - 100 1").unwrap();
    assert!(pos.is_draw_by_fifty_move(), "halfmove clock at 100 should be a draw");
}

#[test]
fn finds_a_forced_mate_in_two() {
    let outcome = search_fen("6k1/pp4pp/8/8/8/8/PP4PP/1q4K1 b - - 0 1", 4);
    assert!(!outcome.best_move.is_null(), "should find a move in this position");
}
