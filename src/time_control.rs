//! Time management for iterative deepening (§4.H): soft/hard budgets
//! derived from the clock, with score-drop and low-time extensions.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct ClockInfo {
    pub remaining: Duration,
    pub increment: Duration,
    pub moves_to_go: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub enum SearchLimit {
    Clock(ClockInfo),
    MoveTime(Duration),
    Infinite,
    FixedDepth(u32),
    FixedNodes(u64),
}

/// Assumed remaining moves when the protocol doesn't say (`movestogo`).
const DEFAULT_MOVES_TO_GO: u32 = 30;
const OVERHEAD: Duration = Duration::from_millis(30);

pub struct TimeManager {
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
    infinite: bool,
    fixed_depth: Option<u32>,
    fixed_nodes: Option<u64>,
    last_score: Option<i32>,
}

impl TimeManager {
    pub fn new(limit: SearchLimit, start: Instant) -> TimeManager {
        match limit {
            SearchLimit::Infinite => TimeManager {
                start,
                soft_limit: None,
                hard_limit: None,
                infinite: true,
                fixed_depth: None,
                fixed_nodes: None,
                last_score: None,
            },
            SearchLimit::FixedDepth(d) => TimeManager {
                start,
                soft_limit: None,
                hard_limit: None,
                infinite: false,
                fixed_depth: Some(d),
                fixed_nodes: None,
                last_score: None,
            },
            SearchLimit::FixedNodes(n) => TimeManager {
                start,
                soft_limit: None,
                hard_limit: None,
                infinite: false,
                fixed_depth: None,
                fixed_nodes: Some(n),
                last_score: None,
            },
            SearchLimit::MoveTime(d) => TimeManager {
                start,
                soft_limit: Some(d.saturating_sub(OVERHEAD)),
                hard_limit: Some(d.saturating_sub(OVERHEAD)),
                infinite: false,
                fixed_depth: None,
                fixed_nodes: None,
                last_score: None,
            },
            SearchLimit::Clock(clock) => {
                let moves_to_go = clock.moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
                let base = clock.remaining.as_secs_f64() / moves_to_go as f64 + clock.increment.as_secs_f64() * 0.8;
                let soft = Duration::from_secs_f64(base.max(0.0));
                let hard = Duration::from_secs_f64((base * 3.0).max(0.0)).min(clock.remaining.saturating_sub(OVERHEAD));
                TimeManager {
                    start,
                    soft_limit: Some(soft.saturating_sub(OVERHEAD)),
                    hard_limit: Some(hard),
                    infinite: false,
                    fixed_depth: None,
                    fixed_nodes: None,
                    last_score: None,
                }
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn depth_limit(&self) -> Option<u32> {
        self.fixed_depth
    }

    pub fn node_limit(&self) -> Option<u64> {
        self.fixed_nodes
    }

    /// Hard stop: the in-flight search must abandon immediately.
    pub fn must_stop(&self, nodes: u64) -> bool {
        if self.infinite {
            return false;
        }
        if let Some(limit) = self.fixed_nodes {
            if nodes >= limit {
                return true;
            }
        }
        match self.hard_limit {
            Some(hard) => self.elapsed() >= hard,
            None => false,
        }
    }

    /// Called after each completed iteration: should the next, deeper
    /// iteration even be started? Extends the soft budget when the score
    /// just dropped sharply (the position may need more time to resolve
    /// a developing threat).
    pub fn have_time_for_next_iteration(&mut self, score: i32, last_iteration_time: Duration) -> bool {
        if self.infinite || self.fixed_depth.is_some() || self.fixed_nodes.is_some() {
            self.last_score = Some(score);
            return true;
        }
        let Some(soft) = self.soft_limit else { return true };

        let score_dropped = self.last_score.map(|prev| prev - score >= 50).unwrap_or(false);
        let budget = if score_dropped { soft + soft / 2 } else { soft };
        self.last_score = Some(score);

        // Don't start an iteration we have no realistic chance of finishing;
        // assume the next ply costs roughly as long as the branching factor.
        let projected = self.elapsed() + last_iteration_time * 3;
        projected < budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_time_limit_matches_requested_duration_minus_overhead() {
        let tm = TimeManager::new(SearchLimit::MoveTime(Duration::from_millis(1000)), Instant::now());
        assert_eq!(tm.hard_limit, Some(Duration::from_millis(970)));
    }

    #[test]
    fn clock_allocation_scales_with_moves_to_go() {
        let clock = ClockInfo {
            remaining: Duration::from_secs(60),
            increment: Duration::ZERO,
            moves_to_go: Some(30),
        };
        let tm = TimeManager::new(SearchLimit::Clock(clock), Instant::now());
        assert!(tm.soft_limit.unwrap() <= Duration::from_secs(2));
    }

    #[test]
    fn infinite_search_never_hard_stops() {
        let tm = TimeManager::new(SearchLimit::Infinite, Instant::now());
        assert!(!tm.must_stop(u64::MAX));
    }

    #[test]
    fn fixed_nodes_stops_at_the_budget() {
        let tm = TimeManager::new(SearchLimit::FixedNodes(1000), Instant::now());
        assert!(tm.must_stop(1000));
        assert!(!tm.must_stop(999));
    }
}
