//! Elo-based strength limiter (§4.I): scales search depth/speed, move
//! selection noise, and evaluation weights so the engine plays at a
//! requested strength rather than its full playing strength.

use crate::eval::EvalConfig;
use crate::moves::ScoredMove;

pub const MIN_ELO: i32 = 500;
pub const MAX_ELO: i32 = 2900;

/// One named strength tier; dampeners interpolate linearly between the
/// tier below and the tier above a requested Elo.
#[derive(Debug, Clone, Copy)]
struct Tier {
    elo: i32,
    dampen: i32,
    node_rate: f64,
    blunder_probability: f64,
    move_error_centipawns: i32,
}

const TIERS: [Tier; 10] = [
    Tier { elo: 500, dampen: 24, node_rate: 0.02, blunder_probability: 0.35, move_error_centipawns: 220 },
    Tier { elo: 800, dampen: 36, node_rate: 0.04, blunder_probability: 0.28, move_error_centipawns: 180 },
    Tier { elo: 1100, dampen: 48, node_rate: 0.07, blunder_probability: 0.22, move_error_centipawns: 150 },
    Tier { elo: 1400, dampen: 62, node_rate: 0.12, blunder_probability: 0.16, move_error_centipawns: 120 },
    Tier { elo: 1700, dampen: 76, node_rate: 0.20, blunder_probability: 0.11, move_error_centipawns: 90 },
    Tier { elo: 2000, dampen: 88, node_rate: 0.32, blunder_probability: 0.07, move_error_centipawns: 60 },
    Tier { elo: 2200, dampen: 96, node_rate: 0.48, blunder_probability: 0.04, move_error_centipawns: 40 },
    Tier { elo: 2400, dampen: 108, node_rate: 0.66, blunder_probability: 0.02, move_error_centipawns: 25 },
    Tier { elo: 2650, dampen: 118, node_rate: 0.85, blunder_probability: 0.008, move_error_centipawns: 12 },
    Tier { elo: 2900, dampen: 128, node_rate: 1.0, blunder_probability: 0.0, move_error_centipawns: 0 },
];

#[derive(Debug, Clone, Copy)]
pub struct StrengthParams {
    pub elo: i32,
    pub dampen_per_128: i32,
    pub node_rate: f64,
    pub blunder_probability: f64,
    pub move_error_centipawns: i32,
}

impl StrengthParams {
    pub fn for_elo(requested_elo: i32) -> StrengthParams {
        let elo = requested_elo.clamp(MIN_ELO, MAX_ELO);
        let (lo, hi) = bracket(elo);
        let t = if hi.elo == lo.elo { 0.0 } else { (elo - lo.elo) as f64 / (hi.elo - lo.elo) as f64 };
        StrengthParams {
            elo,
            dampen_per_128: lerp_i32(lo.dampen, hi.dampen, t),
            node_rate: lerp_f64(lo.node_rate, hi.node_rate, t),
            blunder_probability: lerp_f64(lo.blunder_probability, hi.blunder_probability, t),
            move_error_centipawns: lerp_i32(lo.move_error_centipawns, hi.move_error_centipawns, t),
        }
    }

    /// Caps nodes-per-move proportionally to the tier's node rate, relative
    /// to a full-strength budget.
    pub fn node_budget(&self, full_strength_budget: u64) -> u64 {
        ((full_strength_budget as f64) * self.node_rate).max(1.0) as u64
    }

    /// Applies this tier's dampeners to every ambient weight in an
    /// `EvalConfig`, reweighting toward simpler, more material-driven play
    /// as strength decreases (weaker engines historically play more on
    /// raw material than subtle positional factors).
    pub fn apply_to_eval(&self, cfg: &mut EvalConfig) {
        let d = self.dampen_per_128;
        cfg.dampen_piece_location = d;
        cfg.dampen_pawn_structure = d;
        cfg.dampen_passed_pawns = d;
        cfg.dampen_mobility = d;
        cfg.dampen_king_safety = d;
        cfg.dampen_threats = d;
        cfg.dampen_minor_pieces = d;
        cfg.dampen_major_pieces = d;
        cfg.dampen_endgame_scale = d;
        // Material itself stays weighted toward full strength: a weak
        // engine should still know a queen from a pawn.
        cfg.dampen_material = d + (128 - d) / 2;
    }
}

fn bracket(elo: i32) -> (Tier, Tier) {
    for pair in TIERS.windows(2) {
        if elo <= pair[1].elo {
            return (pair[0], pair[1]);
        }
    }
    (TIERS[TIERS.len() - 2], TIERS[TIERS.len() - 1])
}

fn lerp_i32(a: i32, b: i32, t: f64) -> i32 {
    (a as f64 + (b - a) as f64 * t).round() as i32
}

fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Root-move selection under a strength cap: among the candidate moves
/// (already scored and sorted best-first by the full search), the engine
/// sometimes deliberately plays a inferior-but-"reasonable" move instead
/// of the true best one, simulating human-like error.
///
/// `rng_unit` is a caller-supplied uniform sample in `[0, 1)` so this stays
/// deterministic and testable; production callers drive it from the
/// engine's shared RNG.
pub fn pick_move_with_error(candidates: &[ScoredMove], params: &StrengthParams, rng_unit: f64) -> Option<ScoredMove> {
    if candidates.is_empty() {
        return None;
    }
    let best = candidates[0];

    let blunder = rng_unit < params.blunder_probability;
    let error_budget = if blunder {
        params.move_error_centipawns * 3
    } else {
        params.move_error_centipawns
    };

    // Reasonable-move filter: exclude anything that loses more than twice
    // the normal error budget relative to the best move, even when
    // "simulating a blunder" — a strength-limited engine still should not
    // hang mate in one.
    let floor = best.score - error_budget.max(1) * 2;
    let reasonable: Vec<&ScoredMove> = candidates.iter().filter(|c| c.score >= floor).collect();

    let within_budget: Vec<&ScoredMove> = reasonable
        .iter()
        .filter(|c| best.score - c.score <= error_budget)
        .copied()
        .collect();

    let pool = if within_budget.is_empty() { reasonable } else { within_budget };
    let idx = ((rng_unit * pool.len() as f64) as usize).min(pool.len().saturating_sub(1));
    pool.get(idx).copied().copied()
}
