//! Evaluation configuration (§4.J): a plain-data record of tunable weights
//! consumed by both the evaluator (§4.E) and the strength limiter (§4.I).
//! No evaluation formula hardcodes a weight; every number here is data.

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    // --- Material (index: pawn, knight, bishop, rook, queen, king) ---
    pub material_mg: [i32; 6],
    pub material_eg: [i32; 6],

    // --- Piece-square tables, tapered, indexed [kind][square from White's view] ---
    pub pst_mg: [[i32; 64]; 6],
    pub pst_eg: [[i32; 64]; 6],

    // --- Pawn structure ---
    pub isolated_pawn_penalty_mg: i32,
    pub isolated_pawn_penalty_eg: i32,
    pub doubled_pawn_penalty_mg: i32,
    pub doubled_pawn_penalty_eg: i32,
    pub passed_pawn_scale: i32,
    pub passed_pawn_power: i32,
    pub passed_free_bonus: i32,
    pub passed_unstoppable_bonus: i32,
    pub passed_connected_bonus: i32,
    pub passed_king_escort_bonus: i32,

    // --- Mobility (per extra safe square, per piece kind; zero-averaged) ---
    pub mobility_mg: [i32; 6],
    pub mobility_eg: [i32; 6],

    // --- King safety ---
    pub king_inner_ring_weight: [i32; 6],
    pub king_outer_ring_weight: [i32; 6],
    pub king_semi_open_file_penalty: i32,
    pub king_missing_shield_penalty: i32,
    pub king_safety_curve_scale: i32,
    pub king_safety_curve_divisor: i32,

    // --- Threats ---
    pub threat_pawn_attacks_minor: i32,
    pub threat_pawn_attacks_major: i32,
    pub threat_minor_attacks_major: i32,

    // --- Minor pieces ---
    pub bishop_pair_bonus_mg: i32,
    pub bishop_pair_bonus_eg: i32,
    pub knight_outpost_bonus: i32,
    pub bishop_outpost_bonus: i32,

    // --- Major pieces ---
    pub rook_on_seventh_mg: i32,
    pub rook_on_seventh_eg: i32,

    // --- Endgame scaling (per 128) ---
    pub scale_opposite_bishop_base: i32,
    pub scale_opposite_bishop_per_passed: i32,
    pub scale_minor_only_no_pawns: i32,

    // --- Limit-strength dampeners (per 128, applied at low Elo, §4.I) ---
    pub dampen_material: i32,
    pub dampen_piece_location: i32,
    pub dampen_pawn_structure: i32,
    pub dampen_passed_pawns: i32,
    pub dampen_mobility: i32,
    pub dampen_king_safety: i32,
    pub dampen_threats: i32,
    pub dampen_minor_pieces: i32,
    pub dampen_major_pieces: i32,
    pub dampen_endgame_scale: i32,
}

impl EvalConfig {
    /// Bulk reset to the reference defaults (§4.J).
    pub fn reset_to_defaults(&mut self) {
        *self = EvalConfig::default();
    }
}

/// Central-biased piece-square table, the classic "bonus for controlling
/// the center, penalty near the rim" shape scaled per piece kind. This
/// substitutes for a hand-tuned table; every weight stays ordinary `i32`
/// data so retuning never touches code.
fn centered_table(center_bonus: i32, edge_penalty: i32, rank_bonus_per_step: i32, forward_is_white: bool) -> [i32; 64] {
    let mut t = [0i32; 64];
    for rank in 0..8i32 {
        for file in 0..8i32 {
            let sq = (rank * 8 + file) as usize;
            let fdist = (3.5 - file as f32).abs();
            let rdist = (3.5 - rank as f32).abs();
            let centrality = (4.0 - fdist).max(0.0) + (4.0 - rdist).max(0.0);
            let base = (centrality * center_bonus as f32 / 8.0) as i32 - edge_penalty;
            let forward_rank = if forward_is_white { 7 - rank } else { rank };
            t[sq] = base + forward_rank * rank_bonus_per_step;
        }
    }
    t
}

impl Default for EvalConfig {
    fn default() -> Self {
        let pawn_mg = centered_table(10, 0, 4, true);
        let pawn_eg = centered_table(6, 0, 8, true);
        let knight_mg = centered_table(30, 40, 0, true);
        let knight_eg = centered_table(20, 30, 0, true);
        let bishop_mg = centered_table(20, 20, 0, true);
        let bishop_eg = centered_table(12, 10, 0, true);
        let rook_mg = centered_table(8, 0, 2, true);
        let rook_eg = centered_table(8, 0, 2, true);
        let queen_mg = centered_table(10, 10, 0, true);
        let queen_eg = centered_table(14, 0, 2, true);
        let king_mg = centered_table(-10, 30, -6, true);
        let king_eg = centered_table(20, 0, 4, true);

        EvalConfig {
            material_mg: [82, 337, 365, 477, 1025, 0],
            material_eg: [94, 281, 297, 512, 936, 0],

            pst_mg: [pawn_mg, knight_mg, bishop_mg, rook_mg, queen_mg, king_mg],
            pst_eg: [pawn_eg, knight_eg, bishop_eg, rook_eg, queen_eg, king_eg],

            isolated_pawn_penalty_mg: 12,
            isolated_pawn_penalty_eg: 18,
            doubled_pawn_penalty_mg: 10,
            doubled_pawn_penalty_eg: 20,
            passed_pawn_scale: 5,
            passed_pawn_power: 2,
            passed_free_bonus: 15,
            passed_unstoppable_bonus: 400,
            passed_connected_bonus: 12,
            passed_king_escort_bonus: 8,

            mobility_mg: [0, 4, 5, 3, 2, 0],
            mobility_eg: [0, 3, 4, 4, 5, 0],

            king_inner_ring_weight: [2, 5, 5, 6, 8, 0],
            king_outer_ring_weight: [1, 2, 2, 3, 4, 0],
            king_semi_open_file_penalty: 12,
            king_missing_shield_penalty: 10,
            king_safety_curve_scale: 100,
            king_safety_curve_divisor: 4,

            threat_pawn_attacks_minor: 45,
            threat_pawn_attacks_major: 55,
            threat_minor_attacks_major: 35,

            bishop_pair_bonus_mg: 30,
            bishop_pair_bonus_eg: 45,
            knight_outpost_bonus: 20,
            bishop_outpost_bonus: 15,

            rook_on_seventh_mg: 15,
            rook_on_seventh_eg: 25,

            scale_opposite_bishop_base: 64,
            scale_opposite_bishop_per_passed: 8,
            scale_minor_only_no_pawns: 32,

            dampen_material: 128,
            dampen_piece_location: 128,
            dampen_pawn_structure: 128,
            dampen_passed_pawns: 128,
            dampen_mobility: 128,
            dampen_king_safety: 128,
            dampen_threats: 128,
            dampen_minor_pieces: 128,
            dampen_major_pieces: 128,
            dampen_endgame_scale: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reset_restores_material() {
        let mut cfg = EvalConfig::default();
        cfg.material_mg[0] = 1;
        cfg.reset_to_defaults();
        assert_eq!(cfg.material_mg[0], 82);
    }

    #[test]
    fn queen_material_is_highest() {
        let cfg = EvalConfig::default();
        let max = cfg.material_mg[..5].iter().max().copied().unwrap();
        assert_eq!(max, cfg.material_mg[4]);
    }
}
