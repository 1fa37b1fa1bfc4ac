//! Static position evaluation (§4.E): tapered material + piece-square
//! scoring, pawn structure, mobility/king-safety/threats, minor- and
//! major-piece terms, and endgame scaling, all driven by `EvalConfig`.

pub mod config;

pub use config::EvalConfig;

use crate::bitboard::{self, popcount, Bitboard};
use crate::magic;
use crate::position::Position;
use crate::types::{Color, ColorlessPiece, Square};

pub const MAX_PHASE: i32 = 128;

#[derive(Default, Clone, Copy)]
struct Tapered {
    mg: i32,
    eg: i32,
}

impl Tapered {
    #[inline]
    fn add(&mut self, mg: i32, eg: i32) {
        self.mg += mg;
        self.eg += eg;
    }

    #[inline]
    fn taper(self, phase: i32) -> i32 {
        (self.mg * phase + self.eg * (MAX_PHASE - phase)) / MAX_PHASE
    }
}

fn mirror(sq: Square, color: Color) -> usize {
    match color {
        Color::White => sq.index(),
        Color::Black => Square::from_file_rank(sq.file(), 7 - sq.rank()).index(),
    }
}

pub fn game_phase(pos: &Position) -> i32 {
    let n = |kind: ColorlessPiece| {
        (popcount(pos.pieces[0][kind.index()]) + popcount(pos.pieces[1][kind.index()])) as i32
    };
    let phase = 5 * n(ColorlessPiece::Knight) + 5 * n(ColorlessPiece::Bishop) + 11 * n(ColorlessPiece::Rook) + 22 * n(ColorlessPiece::Queen);
    phase.min(MAX_PHASE)
}

/// Returns `(score_from_side_to_move_perspective, drawn_endgame, phase)`.
pub fn evaluate(pos: &Position, cfg: &EvalConfig) -> (i32, bool, i32) {
    if pos.is_draw_by_material() {
        return (0, true, 0);
    }

    if let Some((white_score, drawn)) = simple_endgame_score(pos, cfg) {
        let score = if pos.side_to_move == Color::White { white_score } else { -white_score };
        return (score, drawn, game_phase(pos));
    }

    let phase = game_phase(pos);
    let mut total = Tapered::default();

    material_and_pst(pos, cfg, &mut total);
    let mut drawish = false;
    pawn_structure(pos, cfg, &mut total);
    mobility_king_safety_threats(pos, cfg, &mut total);
    minor_piece_structure(pos, cfg, &mut total);
    major_piece_structure(pos, cfg, &mut total);

    let mut score = total.taper(phase);

    let scale = endgame_scale(pos, cfg, &mut drawish, &total);
    if phase < MAX_PHASE / 3 {
        // Apply endgame scaling only meaningfully once material is light;
        // blending avoids a discontinuity at the mg/eg boundary.
        let eg_component = total.eg;
        let scaled_eg = (eg_component * scale) / MAX_PHASE;
        score = (total.mg * phase + scaled_eg * (MAX_PHASE - phase)) / MAX_PHASE;
    }

    let score = if pos.side_to_move == Color::White { score } else { -score };
    (score, drawish, phase)
}

/// Simple/theoretical endgame terminal checks (§4.E step 1), tried before
/// the general evaluator: K vs KP (key-square rule), K vs KBN (corner the
/// lone king toward the bishop's square color), K vs K+Major (corner the
/// lone king and walk the winning king in). Returns a White-perspective
/// score, or `None` when no recognized pattern matches.
fn simple_endgame_score(pos: &Position, cfg: &EvalConfig) -> Option<(i32, bool)> {
    for stronger in [Color::White, Color::Black] {
        let weaker = stronger.other();
        if !is_bare_king(pos, weaker) {
            continue;
        }
        let pawns = popcount(pos.pieces[stronger.index()][ColorlessPiece::Pawn.index()]);
        let knights = popcount(pos.pieces[stronger.index()][ColorlessPiece::Knight.index()]);
        let bishops = popcount(pos.pieces[stronger.index()][ColorlessPiece::Bishop.index()]);
        let rooks = popcount(pos.pieces[stronger.index()][ColorlessPiece::Rook.index()]);
        let queens = popcount(pos.pieces[stronger.index()][ColorlessPiece::Queen.index()]);

        if pawns == 1 && knights == 0 && bishops == 0 && rooks == 0 && queens == 0 {
            return Some(kp_endgame_score(pos, cfg, stronger));
        }
        if pawns == 0 && knights == 1 && bishops == 1 && rooks == 0 && queens == 0 {
            return Some((kbn_corner_score(pos, cfg, stronger), false));
        }
        if pawns == 0 && knights == 0 && bishops == 0 && rooks + queens >= 1 {
            return Some((major_corner_score(pos, cfg, stronger), false));
        }
    }
    None
}

fn is_bare_king(pos: &Position, color: Color) -> bool {
    let idx = color.index();
    pos.pieces[idx][ColorlessPiece::Pawn.index()]
        | pos.pieces[idx][ColorlessPiece::Knight.index()]
        | pos.pieces[idx][ColorlessPiece::Bishop.index()]
        | pos.pieces[idx][ColorlessPiece::Rook.index()]
        | pos.pieces[idx][ColorlessPiece::Queen.index()]
        == 0
}

/// King-and-pawn vs lone king: the classic key-square rule, with the
/// rook-pawn corner exception (defending king reaches the queening corner
/// in time) treated as a draw regardless of the winning king's position.
fn kp_endgame_score(pos: &Position, cfg: &EvalConfig, stronger: Color) -> (i32, bool) {
    let weaker = stronger.other();
    let pawn_sq = bitboard::first_set_square(pos.pieces[stronger.index()][ColorlessPiece::Pawn.index()]);
    let promo_rank = if stronger == Color::White { 0 } else { 7 };
    let promo_sq = Square::from_file_rank(pawn_sq.file(), promo_rank);
    let stronger_king = pos.king_square(stronger);
    let weaker_king = pos.king_square(weaker);
    let is_rook_pawn = pawn_sq.file() == 0 || pawn_sq.file() == 7;

    if is_rook_pawn && bitboard::distance(weaker_king, promo_sq) as i32 <= 1 {
        return (0, true);
    }

    let stronger_dist = bitboard::distance(stronger_king, promo_sq) as i32;
    let weaker_dist = bitboard::distance(weaker_king, promo_sq) as i32;
    let tempo = if pos.side_to_move == stronger { 0 } else { 1 };
    let reaches_key_square = stronger_dist + tempo < weaker_dist;

    if !reaches_key_square {
        return (0, true);
    }

    let rank_from_start = if stronger == Color::White { 7 - pawn_sq.rank() } else { pawn_sq.rank() } as i32;
    let rank_bonus = cfg.passed_pawn_scale * rank_from_start.pow(cfg.passed_pawn_power.max(0) as u32);
    let score = cfg.material_eg[ColorlessPiece::Pawn.index()] + rank_bonus;
    (if stronger == Color::White { score } else { -score }, false)
}

/// King, bishop and knight vs lone king: reward driving the lone king to
/// the corner matching the bishop's square color, and the winning king
/// closing the distance to help deliver mate. Capped below a queen's
/// value so the search never prefers under-promoting to a bishop.
fn kbn_corner_score(pos: &Position, cfg: &EvalConfig, stronger: Color) -> i32 {
    let weaker = stronger.other();
    let bishop_sq = bitboard::first_set_square(pos.pieces[stronger.index()][ColorlessPiece::Bishop.index()]);
    let light_squared = bitboard::bit(bishop_sq) & bitboard::square_color_mask(true) != 0;
    let weaker_king = pos.king_square(weaker);
    let stronger_king = pos.king_square(stronger);
    let target_corner = nearest_matching_corner(weaker_king, light_squared);

    let drive = (7 - bitboard::distance(weaker_king, target_corner) as i32).max(0) * 40;
    let approach = (14 - bitboard::distance(stronger_king, weaker_king) as i32).max(0) * 10;
    let base = cfg.material_eg[ColorlessPiece::Knight.index()] + cfg.material_eg[ColorlessPiece::Bishop.index()];
    let score = (base + drive + approach).min(cfg.material_eg[ColorlessPiece::Queen.index()] - 50);
    if stronger == Color::White {
        score
    } else {
        -score
    }
}

fn nearest_matching_corner(from_sq: Square, light_squared: bool) -> Square {
    let corners = [
        Square::from_file_rank(0, 0),
        Square::from_file_rank(7, 0),
        Square::from_file_rank(0, 7),
        Square::from_file_rank(7, 7),
    ];
    corners
        .into_iter()
        .filter(|&c| (bitboard::bit(c) & bitboard::square_color_mask(true) != 0) == light_squared)
        .min_by_key(|&c| bitboard::distance(from_sq, c))
        .unwrap_or(corners[0])
}

/// King and a lone rook/queen (or more) vs lone king: drive the defending
/// king to any corner and bring the winning king up in support.
fn major_corner_score(pos: &Position, cfg: &EvalConfig, stronger: Color) -> i32 {
    let weaker = stronger.other();
    let weaker_king = pos.king_square(weaker);
    let stronger_king = pos.king_square(stronger);

    let drive = (7 - bitboard::corner_distance(weaker_king) as i32).max(0) * 40;
    let approach = (14 - bitboard::distance(stronger_king, weaker_king) as i32).max(0) * 10;
    let rooks = popcount(pos.pieces[stronger.index()][ColorlessPiece::Rook.index()]) as i32;
    let queens = popcount(pos.pieces[stronger.index()][ColorlessPiece::Queen.index()]) as i32;
    let base = rooks * cfg.material_eg[ColorlessPiece::Rook.index()] + queens * cfg.material_eg[ColorlessPiece::Queen.index()];
    let score = base + drive + approach;
    if stronger == Color::White {
        score
    } else {
        -score
    }
}

fn material_and_pst(pos: &Position, cfg: &EvalConfig, total: &mut Tapered) {
    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        for kind in ColorlessPiece::ALL {
            let mut bb = pos.pieces[color.index()][kind.index()];
            let mat_mg = cfg.material_mg[kind.index()] * cfg.dampen_material / 128;
            let mat_eg = cfg.material_eg[kind.index()] * cfg.dampen_material / 128;
            while bb != 0 {
                let sq = bitboard::pop_first_set_square(&mut bb);
                let pst_sq = mirror(sq, color);
                let mg = (mat_mg + cfg.pst_mg[kind.index()][pst_sq] * cfg.dampen_piece_location / 128) * sign;
                let eg = (mat_eg + cfg.pst_eg[kind.index()][pst_sq] * cfg.dampen_piece_location / 128) * sign;
                total.add(mg, eg);
            }
        }
    }
}

fn pawn_structure(pos: &Position, cfg: &EvalConfig, total: &mut Tapered) {
    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let own_pawns = pos.pieces[color.index()][ColorlessPiece::Pawn.index()];
        let enemy_pawns = pos.pieces[color.other().index()][ColorlessPiece::Pawn.index()];
        let mut bb = own_pawns;
        while bb != 0 {
            let sq = bitboard::pop_first_set_square(&mut bb);
            let file = sq.file();
            let adjacent_files = adjacent_file_mask(file);

            if own_pawns & adjacent_files == 0 {
                total.add(-cfg.isolated_pawn_penalty_mg * cfg.dampen_pawn_structure / 128 * sign, -cfg.isolated_pawn_penalty_eg * cfg.dampen_pawn_structure / 128 * sign);
            }
            let file_count = popcount(own_pawns & bitboard::file_mask(file));
            if file_count > 1 {
                total.add(-cfg.doubled_pawn_penalty_mg * cfg.dampen_pawn_structure / 128 * sign, -cfg.doubled_pawn_penalty_eg * cfg.dampen_pawn_structure / 128 * sign);
            }

            if enemy_pawns & bitboard::passed_pawn_mask(color, sq) == 0 {
                let rank_from_start = if color == Color::White { 7 - sq.rank() } else { sq.rank() } as i32;
                let bonus = cfg.passed_pawn_scale * rank_from_start.pow(cfg.passed_pawn_power.max(0) as u32);
                let bonus = (bonus * cfg.dampen_passed_pawns) / 128;
                total.add(bonus * sign, bonus * sign);

                if enemy_pawns & bitboard::free_pawn_mask(color, sq) == 0 {
                    total.add(cfg.passed_free_bonus * sign, cfg.passed_free_bonus * sign);
                }
                if pawn_is_unstoppable(pos, color, sq) {
                    let bonus = (cfg.passed_unstoppable_bonus * cfg.dampen_passed_pawns) / 128;
                    total.add(0, bonus * sign);
                }
                if own_pawns & adjacent_files & bitboard::passed_pawn_mask(color, sq) != 0 {
                    total.add(cfg.passed_connected_bonus * sign, cfg.passed_connected_bonus * sign);
                }
                let own_king_dist = bitboard::distance(pos.king_square(color), sq) as i32;
                let enemy_king_dist = bitboard::distance(pos.king_square(color.other()), sq) as i32;
                if own_king_dist < enemy_king_dist {
                    total.add(0, cfg.passed_king_escort_bonus * sign);
                }
            }
        }
    }
}

/// Square-of-the-pawn rule with a tempo correction: the pawn is unstoppable
/// when the enemy has no minor or major piece left to stop it and its king
/// cannot reach the promotion square before the pawn queens.
fn pawn_is_unstoppable(pos: &Position, color: Color, sq: Square) -> bool {
    let enemy = color.other();
    let enemy_pieces = pos.pieces[enemy.index()][ColorlessPiece::Knight.index()]
        | pos.pieces[enemy.index()][ColorlessPiece::Bishop.index()]
        | pos.pieces[enemy.index()][ColorlessPiece::Rook.index()]
        | pos.pieces[enemy.index()][ColorlessPiece::Queen.index()];
    if enemy_pieces != 0 {
        return false;
    }
    let promo_rank = if color == Color::White { 0 } else { 7 };
    let promo_sq = Square::from_file_rank(sq.file(), promo_rank);
    let pawn_dist = bitboard::distance(sq, promo_sq) as i32;
    let enemy_king_dist = bitboard::distance(pos.king_square(enemy), promo_sq) as i32;
    let tempo = if pos.side_to_move == enemy { 0 } else { -1 };
    enemy_king_dist > pawn_dist + tempo
}

fn adjacent_file_mask(file: u8) -> Bitboard {
    let mut m = 0;
    if file > 0 {
        m |= bitboard::file_mask(file - 1);
    }
    if file < 7 {
        m |= bitboard::file_mask(file + 1);
    }
    m
}

fn mobility_king_safety_threats(pos: &Position, cfg: &EvalConfig, total: &mut Tapered) {
    let occ = pos.all_occupancy;
    let mut king_threat_index = [0i32; 2];

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let enemy = color.other();
        let enemy_pawn_attacks = pawn_attack_set(pos, enemy);
        let safe_squares = !enemy_pawn_attacks;
        let enemy_king_sq = pos.king_square(enemy);
        let inner = bitboard::inner_ring(enemy_king_sq);
        let outer = bitboard::outer_ring(enemy_king_sq);

        let mut attacker_dist_sum = 0i32;
        let mut attacker_count = 0i32;
        for kind in [ColorlessPiece::Knight, ColorlessPiece::Bishop, ColorlessPiece::Rook, ColorlessPiece::Queen] {
            let mut bb = pos.pieces[color.index()][kind.index()];
            while bb != 0 {
                let sq = bitboard::pop_first_set_square(&mut bb);
                let attacks = magic::sliding_attacks(kind, sq, occ);
                let moves = attacks & !pos.occupancy[color.index()] & safe_squares;
                let count = popcount(moves) as i32;
                total.add(cfg.mobility_mg[kind.index()] * count * sign, cfg.mobility_eg[kind.index()] * count * sign);

                let inner_hits = popcount(attacks & inner) as i32;
                let outer_hits = popcount(attacks & outer) as i32;
                king_threat_index[enemy.index()] +=
                    inner_hits * cfg.king_inner_ring_weight[kind.index()] + outer_hits * cfg.king_outer_ring_weight[kind.index()];

                attacker_dist_sum += bitboard::distance(sq, enemy_king_sq) as i32;
                attacker_count += 1;
            }
        }
        // Mean proximity of attackers: pieces clustered near the enemy king
        // raise the threat index more than the same pieces spread out.
        if attacker_count > 0 {
            let mean_attacker_dist = attacker_dist_sum / attacker_count;
            king_threat_index[enemy.index()] += (8 - mean_attacker_dist).max(0) * 2;
        }

        // Mean distance of defenders to their own king: pieces that have
        // wandered away from home leave the king's own threat index worse.
        let mut defender_dist_sum = 0i32;
        let mut defender_count = 0i32;
        for kind in [ColorlessPiece::Knight, ColorlessPiece::Bishop, ColorlessPiece::Rook, ColorlessPiece::Queen] {
            let mut bb = pos.pieces[enemy.index()][kind.index()];
            while bb != 0 {
                let sq = bitboard::pop_first_set_square(&mut bb);
                defender_dist_sum += bitboard::distance(sq, enemy_king_sq) as i32;
                defender_count += 1;
            }
        }
        if defender_count > 0 {
            let mean_defender_dist = defender_dist_sum / defender_count;
            king_threat_index[enemy.index()] += mean_defender_dist;
        }

        // Pawn threats on minors/majors.
        let enemy_minors = pos.pieces[enemy.index()][ColorlessPiece::Knight.index()] | pos.pieces[enemy.index()][ColorlessPiece::Bishop.index()];
        let enemy_majors = pos.pieces[enemy.index()][ColorlessPiece::Rook.index()] | pos.pieces[enemy.index()][ColorlessPiece::Queen.index()];
        let our_pawn_attacks = pawn_attack_set(pos, color);
        let minor_hits = popcount(our_pawn_attacks & enemy_minors) as i32;
        let major_hits = popcount(our_pawn_attacks & enemy_majors) as i32;
        total.add(
            (cfg.threat_pawn_attacks_minor * minor_hits + cfg.threat_pawn_attacks_major * major_hits) * sign * cfg.dampen_threats / 128,
            0,
        );

        let minor_attack_set = minor_attack_squares(pos, color, occ);
        let minor_on_major = popcount(minor_attack_set & enemy_majors) as i32;
        total.add(cfg.threat_minor_attacks_major * minor_on_major * sign * cfg.dampen_threats / 128, 0);
    }

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let enemy_king_sq = pos.king_square(color);
        let mut shield_penalty = 0;
        if bitboard::pawn_shield_mask(color, enemy_king_sq) & pos.pieces[color.index()][ColorlessPiece::Pawn.index()] == 0 {
            shield_penalty += cfg.king_missing_shield_penalty;
        }
        let semi_open = bitboard::file_mask(enemy_king_sq.file()) & pos.pieces[color.index()][ColorlessPiece::Pawn.index()] == 0;
        if semi_open {
            shield_penalty += cfg.king_semi_open_file_penalty;
        }
        let idx = king_threat_index[color.index()] + shield_penalty;
        let curve = nonlinear_king_safety(idx, cfg);
        total.add(-curve * sign * cfg.dampen_king_safety / 128, 0);
    }
}

fn nonlinear_king_safety(index: i32, cfg: &EvalConfig) -> i32 {
    // Quadratic-ish ramp: small attack indices cost little, large ones cost
    // disproportionately more, approximating standard king-safety curves.
    let scale = cfg.king_safety_curve_scale.max(1);
    let divisor = cfg.king_safety_curve_divisor.max(1);
    (index * index) / (scale * divisor / 10).max(1)
}

fn pawn_attack_set(pos: &Position, color: Color) -> Bitboard {
    let mut bb = pos.pieces[color.index()][ColorlessPiece::Pawn.index()];
    let mut attacks = 0u64;
    while bb != 0 {
        let sq = bitboard::pop_first_set_square(&mut bb);
        attacks |= bitboard::pawn_attacks(color, sq);
    }
    attacks
}

fn minor_attack_squares(pos: &Position, color: Color, occ: Bitboard) -> Bitboard {
    let mut attacks = 0u64;
    for kind in [ColorlessPiece::Knight, ColorlessPiece::Bishop] {
        let mut bb = pos.pieces[color.index()][kind.index()];
        while bb != 0 {
            let sq = bitboard::pop_first_set_square(&mut bb);
            attacks |= magic::sliding_attacks(kind, sq, occ);
        }
    }
    attacks
}

fn minor_piece_structure(pos: &Position, cfg: &EvalConfig, total: &mut Tapered) {
    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let bishops = pos.pieces[color.index()][ColorlessPiece::Bishop.index()];
        let has_light = bishops & bitboard::square_color_mask(true) != 0;
        let has_dark = bishops & bitboard::square_color_mask(false) != 0;
        if has_light && has_dark {
            total.add(cfg.bishop_pair_bonus_mg * sign * cfg.dampen_minor_pieces / 128, cfg.bishop_pair_bonus_eg * sign * cfg.dampen_minor_pieces / 128);
        }

        let own_pawns = pos.pieces[color.index()][ColorlessPiece::Pawn.index()];
        let enemy_pawn_attacks = pawn_attack_set(pos, color.other());
        for (kind, bonus) in [
            (ColorlessPiece::Knight, cfg.knight_outpost_bonus),
            (ColorlessPiece::Bishop, cfg.bishop_outpost_bonus),
        ] {
            let mut bb = pos.pieces[color.index()][kind.index()];
            while bb != 0 {
                let sq = bitboard::pop_first_set_square(&mut bb);
                let rank_from_start = if color == Color::White { 7 - sq.rank() } else { sq.rank() };
                let central_file = (2..=5).contains(&sq.file());
                let supported = bitboard::pawn_attacks(color.other(), sq) & own_pawns != 0;
                let safe = bitboard::bit(sq) & enemy_pawn_attacks == 0;
                if (3..=5).contains(&rank_from_start) && central_file && supported && safe {
                    total.add(bonus * sign * cfg.dampen_minor_pieces / 128, bonus * sign * cfg.dampen_minor_pieces / 128);
                }
            }
        }
    }
}

fn major_piece_structure(pos: &Position, cfg: &EvalConfig, total: &mut Tapered) {
    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let seventh_rank = if color == Color::White { 1u8 } else { 6u8 };
        let enemy_king_sq = pos.king_square(color.other());
        let enemy_back_rank = if color == Color::White { 0u8 } else { 7u8 };
        if enemy_king_sq.rank() != enemy_back_rank {
            continue;
        }
        let rooks_on_seventh = popcount(pos.pieces[color.index()][ColorlessPiece::Rook.index()] & bitboard::rank_mask(seventh_rank)) as i32;
        total.add(
            cfg.rook_on_seventh_mg * rooks_on_seventh * sign * cfg.dampen_major_pieces / 128,
            cfg.rook_on_seventh_eg * rooks_on_seventh * sign * cfg.dampen_major_pieces / 128,
        );
    }
}

/// Returns a per-128 multiplier for the endgame component of the score.
fn endgame_scale(pos: &Position, cfg: &EvalConfig, drawish: &mut bool, total: &Tapered) -> i32 {
    let white_pawns = popcount(pos.pieces[0][ColorlessPiece::Pawn.index()]);
    let black_pawns = popcount(pos.pieces[1][ColorlessPiece::Pawn.index()]);
    let white_bishops = pos.pieces[0][ColorlessPiece::Bishop.index()];
    let black_bishops = pos.pieces[1][ColorlessPiece::Bishop.index()];

    if popcount(white_bishops) == 1 && popcount(black_bishops) == 1 {
        let white_light = white_bishops & bitboard::square_color_mask(true) != 0;
        let black_light = black_bishops & bitboard::square_color_mask(true) != 0;
        if white_light != black_light {
            let passed = white_pawns.max(black_pawns) as i32;
            let scale = cfg.scale_opposite_bishop_base - cfg.scale_opposite_bishop_per_passed * (4 - passed.min(4));
            *drawish = passed <= 1;
            return (scale * cfg.dampen_endgame_scale / 128).clamp(0, MAX_PHASE);
        }
    }

    let white_majors = popcount(pos.pieces[0][ColorlessPiece::Rook.index()] | pos.pieces[0][ColorlessPiece::Queen.index()]);
    let black_majors = popcount(pos.pieces[1][ColorlessPiece::Rook.index()] | pos.pieces[1][ColorlessPiece::Queen.index()]);
    if white_pawns + black_pawns == 0 && white_majors == 0 && black_majors == 0 {
        return (cfg.scale_minor_only_no_pawns * cfg.dampen_endgame_scale / 128).clamp(0, MAX_PHASE);
    }

    trade_up_scale(pos, cfg, total)
}

/// "When ahead, trade pieces; when behind, trade pawns." The side ahead in
/// material having fewer pieces left on the board, or the side behind
/// having fewer pawns left, both push the endgame weighting back toward a
/// full, decisive evaluation rather than a dampened one.
fn trade_up_scale(pos: &Position, cfg: &EvalConfig, total: &Tapered) -> i32 {
    if total.eg == 0 {
        return MAX_PHASE;
    }
    let ahead = if total.eg > 0 { Color::White } else { Color::Black };
    let behind = ahead.other();

    let ahead_pieces = popcount(
        pos.pieces[ahead.index()][ColorlessPiece::Knight.index()]
            | pos.pieces[ahead.index()][ColorlessPiece::Bishop.index()]
            | pos.pieces[ahead.index()][ColorlessPiece::Rook.index()]
            | pos.pieces[ahead.index()][ColorlessPiece::Queen.index()],
    ) as i32;
    let behind_pawns = popcount(pos.pieces[behind.index()][ColorlessPiece::Pawn.index()]) as i32;

    let piece_term = (4 - ahead_pieces.min(4)) * 6;
    let pawn_term = (8 - behind_pawns.min(8)) * 3;
    let scale = MAX_PHASE - 32 + piece_term + pawn_term;
    (scale * cfg.dampen_endgame_scale / 128).clamp(0, MAX_PHASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;

    #[test]
    fn startpos_is_balanced() {
        let pos = crate::position::Position::startpos();
        let cfg = EvalConfig::default();
        let (score, drawn, _) = evaluate(&pos, &cfg);
        assert!(!drawn);
        assert_eq!(score, 0, "symmetric position must evaluate to 0");
    }

    #[test]
    fn evaluation_is_symmetric_under_color_flip() {
        let cfg = EvalConfig::default();
        let pos = parse_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3").unwrap();
        let (score_w, _, _) = evaluate(&pos, &cfg);

        // Mirror vertically and swap colors by feeding the mirrored FEN with
        // the other side to move; the resulting side-to-move score must match.
        let mirrored = mirror_fen(&pos);
        let (score_b, _, _) = evaluate(&mirrored, &cfg);
        assert_eq!(score_w, score_b);
    }

    fn mirror_fen(pos: &crate::position::Position) -> crate::position::Position {
        let mut mirrored = crate::position::Position::empty();
        for color in [Color::White, Color::Black] {
            for kind in ColorlessPiece::ALL {
                let mut bb = pos.pieces[color.index()][kind.index()];
                while bb != 0 {
                    let sq = crate::bitboard::pop_first_set_square(&mut bb);
                    let flipped = Square::from_file_rank(sq.file(), 7 - sq.rank());
                    mirrored.place(color.other(), kind, flipped);
                }
            }
        }
        mirrored.side_to_move = pos.side_to_move.other();
        mirrored
    }

    #[test]
    fn queen_up_is_a_large_advantage() {
        let cfg = EvalConfig::default();
        let with_queen = parse_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let without_queen = parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let (score_with, _, _) = evaluate(&with_queen, &cfg);
        let (score_without, _, _) = evaluate(&without_queen, &cfg);
        assert!(score_with > score_without + 800);
    }
}
