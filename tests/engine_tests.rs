use corvus::board::Board;
use corvus::eval::EvalConfig;
use corvus::search::Searcher;
use corvus::time_control::{SearchLimit, TimeManager};
use corvus::tt::TranspositionTable;
use std::time::{Duration, Instant};

#[test]
fn depth_limited_search_returns_a_legal_move() {
    let mut board = Board::new();
    let mut tt = TranspositionTable::new(4);
    let cfg = EvalConfig::default();
    let time = TimeManager::new(SearchLimit::FixedDepth(1), Instant::now());
    let mut searcher = Searcher::new(&mut board, &mut tt, &cfg, time);
    let outcome = searcher.iterative_deepening(1, |_| {});
    assert!(!outcome.best_move.is_null());
}

#[test]
fn time_limited_search_respects_the_budget() {
    let mut board = Board::new();
    let mut tt = TranspositionTable::new(4);
    let cfg = EvalConfig::default();
    let start = Instant::now();
    let time = TimeManager::new(SearchLimit::MoveTime(Duration::from_millis(50)), start);
    let mut searcher = Searcher::new(&mut board, &mut tt, &cfg, time);
    let outcome = searcher.iterative_deepening(64, |_| {});
    assert!(!outcome.best_move.is_null());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn fixed_node_search_stays_within_the_node_cap() {
    let mut board = Board::new();
    let mut tt = TranspositionTable::new(4);
    let cfg = EvalConfig::default();
    let time = TimeManager::new(SearchLimit::FixedNodes(5_000), Instant::now());
    let mut searcher = Searcher::new(&mut board, &mut tt, &cfg, time);
    let outcome = searcher.iterative_deepening(64, |_| {});
    assert!(!outcome.best_move.is_null());
    assert!(searcher.nodes() < 50_000, "node cap was not respected: {}", searcher.nodes());
}
