//! Formats UCI `info` lines from search progress.

use crate::moves::Move;
use crate::search::SearchOutcome;
use crate::tt::MATE_THRESHOLD;
use std::time::Duration;

pub fn info_line(outcome: &SearchOutcome, elapsed: Duration, hashfull: u32) -> String {
    let mut s = format!("info depth {} nodes {} time {}", outcome.depth, outcome.nodes, elapsed.as_millis());

    let nps = if elapsed.as_millis() > 0 {
        (outcome.nodes as u128 * 1000 / elapsed.as_millis()) as u64
    } else {
        0
    };
    s.push_str(&format!(" nps {}", nps));
    s.push_str(&format!(" hashfull {}", hashfull));

    if outcome.score.abs() >= MATE_THRESHOLD {
        let plies_to_mate = crate::tt::MATE_SCORE - outcome.score.abs();
        let moves_to_mate = (plies_to_mate + 1) / 2;
        let signed = if outcome.score > 0 { moves_to_mate } else { -moves_to_mate };
        s.push_str(&format!(" score mate {}", signed));
    } else {
        s.push_str(&format!(" score cp {}", outcome.score));
    }

    if !outcome.pv.is_empty() {
        s.push_str(" pv");
        for mv in &outcome.pv {
            s.push(' ');
            s.push_str(&mv.to_uci());
        }
    }
    s
}

pub fn bestmove_line(mv: Move) -> String {
    if mv.is_null() {
        "bestmove 0000".to_string()
    } else {
        format!("bestmove {}", mv.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_score_formats_as_mate_in_n() {
        let outcome = SearchOutcome {
            best_move: Move::NULL,
            score: crate::tt::MATE_SCORE - 3,
            depth: 5,
            nodes: 100,
            pv: vec![],
        };
        let line = info_line(&outcome, Duration::from_millis(10), 0);
        assert!(line.contains("score mate 2"));
    }

    #[test]
    fn centipawn_score_formats_plainly() {
        let outcome = SearchOutcome {
            best_move: Move::NULL,
            score: 37,
            depth: 4,
            nodes: 500,
            pv: vec![],
        };
        let line = info_line(&outcome, Duration::from_millis(100), 5);
        assert!(line.contains("score cp 37"));
    }
}
