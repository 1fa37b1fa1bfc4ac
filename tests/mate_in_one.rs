//! A small self-contained suite of forced mates, checked both by direct
//! position verification and by running the search to confirm it finds them.

use corvus::board::Board;
use corvus::eval::EvalConfig;
use corvus::fen::parse_fen;
use corvus::search::Searcher;
use corvus::time_control::{SearchLimit, TimeManager};
use corvus::tt::TranspositionTable;
use std::time::Instant;

struct MateInOne {
    fen: &'static str,
    mating_move: &'static str,
}

const MATE_IN_ONE: &[MateInOne] = &[
    MateInOne { fen: "6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1", mating_move: "e1e8" },
    MateInOne { fen: "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 0 4", mating_move: "h5f7" },
    MateInOne { fen: "4k3/8/3K4/8/8/8/8/3R4 w - - 0 1", mating_move: "d1d8" },
];

#[test]
fn the_given_move_actually_delivers_mate() {
    for problem in MATE_IN_ONE {
        let pos = parse_fen(problem.fen).expect("valid fen");
        let mut board = Board::from_position(pos);
        let mv = board
            .current()
            .generate_legal_moves()
            .into_iter()
            .find(|m| m.to_uci() == problem.mating_move)
            .unwrap_or_else(|| panic!("{} not legal in {}", problem.mating_move, problem.fen));
        board.make_move(mv);
        assert!(board.current().is_checkmate(), "{} should be mate after {}", problem.fen, problem.mating_move);
    }
}

#[test]
fn search_finds_every_mate_in_one() {
    for problem in MATE_IN_ONE {
        let pos = parse_fen(problem.fen).expect("valid fen");
        let mut board = Board::from_position(pos);
        let mut tt = TranspositionTable::new(4);
        let cfg = EvalConfig::default();
        let time = TimeManager::new(SearchLimit::FixedDepth(3), Instant::now());
        let mut searcher = Searcher::new(&mut board, &mut tt, &cfg, time);
        let outcome = searcher.iterative_deepening(3, |_| {});
        assert_eq!(
            outcome.best_move.to_uci(),
            problem.mating_move,
            "search did not find the mate for {}",
            problem.fen
        );
    }
}
