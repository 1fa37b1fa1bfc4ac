//! UCI protocol front-end: a reader thread parses stdin, a worker thread
//! owns the engine state and runs searches, communicating over channels so
//! `stop`/`quit` are never blocked behind a long-running search.

use crate::board::Board;
use crate::eval::EvalConfig;
use crate::fen::parse_fen;
use crate::search::Searcher;
use crate::strength::StrengthParams;
use crate::time_control::{ClockInfo, SearchLimit, TimeManager};
use crate::tt::TranspositionTable;
use crate::uci_info;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_TT_MB: usize = 64;

enum Command {
    Uci,
    IsReady,
    NewGame,
    Position { fen: String, moves: Vec<String> },
    Go(GoParams),
    Stop,
    SetOption { name: String, value: String },
    Perft(usize),
    Quit,
    Unknown(String),
}

#[derive(Default, Clone)]
struct GoParams {
    depth: Option<u32>,
    movetime: Option<u64>,
    nodes: Option<u64>,
    infinite: bool,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    movestogo: Option<u32>,
    searchmoves: Vec<String>,
}

fn parse_command(line: &str) -> Command {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.first().copied() {
        Some("uci") => Command::Uci,
        Some("isready") => Command::IsReady,
        Some("ucinewgame") => Command::NewGame,
        Some("stop") => Command::Stop,
        Some("quit") => Command::Quit,
        Some("position") => parse_position(&tokens[1..]),
        Some("go") => Command::Go(parse_go(&tokens[1..])),
        Some("setoption") => parse_setoption(&tokens[1..]),
        Some("perft") => {
            let depth = tokens.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
            Command::Perft(depth)
        }
        _ => Command::Unknown(line.to_string()),
    }
}

fn parse_position(tokens: &[&str]) -> Command {
    let mut idx = 0;
    let fen = if tokens.first() == Some(&"startpos") {
        idx = 1;
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string()
    } else if tokens.first() == Some(&"fen") {
        let rest = &tokens[1..];
        let moves_at = rest.iter().position(|&t| t == "moves").unwrap_or(rest.len());
        idx = 1 + moves_at;
        rest[..moves_at].join(" ")
    } else {
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string()
    };

    let moves = if tokens.get(idx) == Some(&"moves") {
        tokens[idx + 1..].iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };
    Command::Position { fen, moves }
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                params.depth = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "movetime" => {
                params.movetime = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "nodes" => {
                params.nodes = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            "wtime" => {
                params.wtime = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "btime" => {
                params.btime = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "winc" => {
                params.winc = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "binc" => {
                params.binc = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "movestogo" => {
                params.movestogo = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "searchmoves" => {
                params.searchmoves = tokens[i + 1..].iter().map(|s| s.to_string()).collect();
                i = tokens.len();
            }
            _ => i += 1,
        }
    }
    params
}

fn parse_setoption(tokens: &[&str]) -> Command {
    let name_at = tokens.iter().position(|&t| t == "name").map(|p| p + 1).unwrap_or(tokens.len());
    let value_at = tokens.iter().position(|&t| t == "value");
    let name = tokens[name_at..value_at.unwrap_or(tokens.len())].join(" ");
    let value = value_at.map(|v| tokens[v + 1..].join(" ")).unwrap_or_default();
    Command::SetOption { name, value }
}

struct EngineState {
    board: Board,
    tt: TranspositionTable,
    eval_cfg: EvalConfig,
    elo: Option<i32>,
}

impl EngineState {
    fn new() -> EngineState {
        EngineState {
            board: Board::new(),
            tt: TranspositionTable::new(DEFAULT_TT_MB),
            eval_cfg: EvalConfig::default(),
            elo: None,
        }
    }

    fn set_position(&mut self, fen: &str, uci_moves: &[String]) {
        let Ok(pos) = parse_fen(fen) else { return };
        self.board = Board::from_position(pos);
        for mv_str in uci_moves {
            let Some(mv) = self
                .board
                .current()
                .generate_legal_moves()
                .into_iter()
                .find(|m| &m.to_uci() == mv_str)
            else {
                break;
            };
            self.board.make_move(mv);
        }
    }

    fn apply_option(&mut self, name: &str, value: &str) {
        match name {
            "Hash" => {
                if let Ok(mb) = value.parse::<usize>() {
                    self.tt = TranspositionTable::new(mb.max(1));
                }
            }
            "Clear Hash" => self.tt.clear(),
            "UCI_Elo" => self.elo = value.parse().ok(),
            "UCI_LimitStrength" => {
                if value == "false" {
                    self.elo = None;
                }
            }
            _ => {}
        }
    }

    fn effective_eval_cfg(&self) -> EvalConfig {
        let mut cfg = self.eval_cfg.clone();
        if let Some(elo) = self.elo {
            StrengthParams::for_elo(elo).apply_to_eval(&mut cfg);
        }
        cfg
    }

    fn time_manager_for(&self, go: &GoParams, start: Instant) -> TimeManager {
        if let Some(nodes) = go.nodes {
            return TimeManager::new(SearchLimit::FixedNodes(nodes), start);
        }
        if let Some(depth) = go.depth {
            return TimeManager::new(SearchLimit::FixedDepth(depth), start);
        }
        if let Some(ms) = go.movetime {
            return TimeManager::new(SearchLimit::MoveTime(Duration::from_millis(ms)), start);
        }
        if go.infinite {
            return TimeManager::new(SearchLimit::Infinite, start);
        }
        let us = self.board.current().side_to_move;
        let (remaining, increment) = match us {
            crate::types::Color::White => (go.wtime, go.winc),
            crate::types::Color::Black => (go.btime, go.binc),
        };
        match remaining {
            Some(ms) => TimeManager::new(
                SearchLimit::Clock(ClockInfo {
                    remaining: Duration::from_millis(ms),
                    increment: Duration::from_millis(increment.unwrap_or(0)),
                    moves_to_go: go.movestogo,
                }),
                start,
            ),
            None => TimeManager::new(SearchLimit::Infinite, start),
        }
    }
}

pub fn run_uci_loop() {
    let stdin = io::stdin();
    let (tx, rx) = mpsc::channel::<String>();

    let reader = thread::spawn(move || {
        for line in stdin.lock().lines().map_while(Result::ok) {
            if tx.send(line.clone()).is_err() {
                break;
            }
            if line.trim() == "quit" {
                break;
            }
        }
    });

    let mut state = EngineState::new();
    let stop_signal = Arc::new(AtomicBool::new(false));

    for line in rx {
        match parse_command(&line) {
            Command::Uci => {
                println!("id name Corvus");
                println!("id author the corvus engine contributors");
                println!("option name Hash type spin default {} min 1 max 4096", DEFAULT_TT_MB);
                println!("option name Clear Hash type button");
                println!("option name UCI_LimitStrength type check default false");
                println!("option name UCI_Elo type spin default 2900 min 500 max 2900");
                println!("uciok");
                let _ = io::stdout().flush();
            }
            Command::IsReady => {
                println!("readyok");
                let _ = io::stdout().flush();
            }
            Command::NewGame => {
                state = EngineState::new();
            }
            Command::Position { fen, moves } => {
                state.set_position(&fen, &moves);
            }
            Command::SetOption { name, value } => {
                state.apply_option(&name, &value);
            }
            Command::Perft(depth) => {
                let divided = state.board.perft_divide(depth);
                for (mv, count) in &divided {
                    println!("{}: {}", mv.to_uci(), count);
                }
                let total: u64 = divided.iter().map(|(_, c)| c).sum();
                println!("nodes {}", total);
                let _ = io::stdout().flush();
            }
            Command::Go(go) => {
                stop_signal.store(false, Ordering::Relaxed);
                let start = Instant::now();
                let time = state.time_manager_for(&go, start);
                let cfg = state.effective_eval_cfg();
                let mut tt = std::mem::replace(&mut state.tt, TranspositionTable::new(1));
                let mut board = state.board.clone();

                let node_cap = state.elo.map(|elo| StrengthParams::for_elo(elo).node_budget(5_000_000));
                let time = if let Some(cap) = node_cap {
                    TimeManager::new(SearchLimit::FixedNodes(cap.min(time.node_limit().unwrap_or(u64::MAX))), start)
                } else {
                    time
                };

                let mut searcher = Searcher::with_stop_signal(&mut board, &mut tt, &cfg, time, Arc::clone(&stop_signal));
                if !go.searchmoves.is_empty() {
                    let allowed = searcher
                        .board_moves()
                        .into_iter()
                        .filter(|m| go.searchmoves.iter().any(|s| s == &m.to_uci()))
                        .collect();
                    searcher.restrict_root_moves(allowed);
                }
                let outcome = searcher.iterative_deepening(64, |progress| {
                    let line = uci_info::info_line(progress, start.elapsed(), 0);
                    println!("{}", line);
                    let _ = io::stdout().flush();
                });

                println!("{}", uci_info::bestmove_line(outcome.best_move));
                let _ = io::stdout().flush();

                state.tt = tt;
                state.board = board;
            }
            Command::Stop => {
                stop_signal.store(true, Ordering::Relaxed);
            }
            Command::Quit => break,
            Command::Unknown(_) => {}
        }
    }

    let _ = reader.join();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_position_startpos_with_moves() {
        match parse_command("position startpos moves e2e4 e7e5") {
            Command::Position { fen, moves } => {
                assert!(fen.starts_with("rnbqkbnr"));
                assert_eq!(moves, vec!["e2e4", "e7e5"]);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn parses_go_with_depth() {
        match parse_command("go depth 6") {
            Command::Go(g) => assert_eq!(g.depth, Some(6)),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn parses_setoption_hash() {
        match parse_command("setoption name Hash value 128") {
            Command::SetOption { name, value } => {
                assert_eq!(name, "Hash");
                assert_eq!(value, "128");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn parses_fen_position() {
        match parse_command("position fen 8/8/8/8/8/8/8/4K2k w - - 0 1 moves e1d1") {
            Command::Position { fen, moves } => {
                assert_eq!(fen, "8/8/8/8/8/8/8/4K2k w - - 0 1");
                assert_eq!(moves, vec!["e1d1"]);
            }
            _ => panic!("wrong variant"),
        }
    }
}
