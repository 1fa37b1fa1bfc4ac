//! Transposition cache: fixed-capacity, open-addressed, generation-aged
//! (§4.D). Mate scores are stored distance-agnostic and adjusted back to
//! the current ply on retrieval.

use crate::moves::Move;

pub const MATE_SCORE: i32 = 30_000;
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: u64,
    best_move: Move,
    depth: i16,
    score: i32,
    bound: Bound,
    generation: u8,
}

pub struct TranspositionTable {
    slots: Vec<Option<Entry>>,
    mask: usize,
    generation: u8,
}

impl TranspositionTable {
    pub fn new(size_mb: usize) -> TranspositionTable {
        let entry_size = std::mem::size_of::<Option<Entry>>().max(1);
        let requested = (size_mb * 1024 * 1024 / entry_size).max(1024);
        let capacity = requested.next_power_of_two() / 2;
        let capacity = capacity.max(1024);
        TranspositionTable {
            slots: vec![None; capacity],
            mask: capacity - 1,
            generation: 0,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    pub fn new_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.generation = 0;
    }

    /// Mate-distance adjustment: store scores as if the mate happened at
    /// ply 0, so values are portable across the ply at which they are found.
    fn score_to_tt(score: i32, ply: i32) -> i32 {
        if score >= MATE_THRESHOLD {
            score + ply
        } else if score <= -MATE_THRESHOLD {
            score - ply
        } else {
            score
        }
    }

    fn score_from_tt(score: i32, ply: i32) -> i32 {
        if score >= MATE_THRESHOLD {
            score - ply
        } else if score <= -MATE_THRESHOLD {
            score + ply
        } else {
            score
        }
    }

    pub fn store(&mut self, key: u64, ply: i32, depth: i32, score: i32, bound: Bound, best_move: Move) {
        let idx = self.index(key);
        let stored_score = Self::score_to_tt(score, ply);
        let replace = match &self.slots[idx] {
            None => true,
            Some(e) => e.generation != self.generation || depth as i16 >= e.depth,
        };
        if replace {
            self.slots[idx] = Some(Entry {
                key,
                best_move,
                depth: depth as i16,
                score: stored_score,
                bound,
                generation: self.generation,
            });
        }
    }

    pub fn probe(&self, key: u64, ply: i32) -> Option<ProbeResult> {
        let idx = self.index(key);
        let e = self.slots[idx]?;
        if e.key != key {
            return None;
        }
        Some(ProbeResult {
            best_move: e.best_move,
            depth: e.depth as i32,
            score: Self::score_from_tt(e.score, ply),
            bound: e.bound,
        })
    }

    /// Best-move hint, independent of score cutoff eligibility.
    pub fn best_move(&self, key: u64) -> Option<Move> {
        let idx = self.index(key);
        let e = self.slots[idx]?;
        (e.key == key && !e.best_move.is_null()).then_some(e.best_move)
    }

    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let used = self.slots[..sample]
            .iter()
            .filter(|s| matches!(s, Some(e) if e.generation == self.generation))
            .count();
        ((used * 1000) / sample) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProbeResult {
    pub best_move: Move,
    pub depth: i32,
    pub score: i32,
    pub bound: Bound,
}

impl ProbeResult {
    /// Apply §4.D's cutoff semantics against the current alpha/beta window.
    pub fn cutoff(&self, alpha: i32, beta: i32) -> Option<i32> {
        match self.bound {
            Bound::Exact => Some(self.score.clamp(alpha, beta)),
            Bound::UpperBound if self.score <= alpha => Some(alpha),
            Bound::LowerBound if self.score >= beta => Some(beta),
            _ => None,
        }
    }
}
