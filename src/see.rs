//! Static Exchange Evaluation: the material result of resolving all
//! captures on a single square, least-valuable-attacker first.

use crate::bitboard::{self, bit, Bitboard};
use crate::eval::EvalConfig;
use crate::magic;
use crate::moves::Move;
use crate::position::Position;
use crate::types::{Color, ColorlessPiece, Square};

fn piece_value(cfg: &EvalConfig, kind: ColorlessPiece) -> i32 {
    match kind {
        ColorlessPiece::None => 0,
        ColorlessPiece::King => 20_000,
        _ => cfg.material_mg[kind.index()],
    }
}

fn attackers_to_square(pos: &Position, sq: Square, occ: Bitboard) -> Bitboard {
    let mut attackers = 0u64;
    for color in [Color::White, Color::Black] {
        let pieces = &pos.pieces[color.index()];
        attackers |= bitboard::pawn_attacks(color.other(), sq) & pieces[ColorlessPiece::Pawn.index()];
        attackers |= bitboard::knight_attacks(sq) & pieces[ColorlessPiece::Knight.index()];
        attackers |= bitboard::king_step_attacks(sq) & pieces[ColorlessPiece::King.index()];
        let bishops_queens = pieces[ColorlessPiece::Bishop.index()] | pieces[ColorlessPiece::Queen.index()];
        attackers |= magic::bishop_attacks(sq, occ) & bishops_queens;
        let rooks_queens = pieces[ColorlessPiece::Rook.index()] | pieces[ColorlessPiece::Queen.index()];
        attackers |= magic::rook_attacks(sq, occ) & rooks_queens;
    }
    attackers
}

fn least_valuable_attacker(pos: &Position, attackers: Bitboard, color: Color) -> Option<(Square, ColorlessPiece)> {
    let own = attackers & pos.occupancy[color.index()];
    for kind in ColorlessPiece::ALL {
        let bb = own & pos.pieces[color.index()][kind.index()];
        if bb != 0 {
            return Some((bitboard::first_set_square(bb), kind));
        }
    }
    None
}

/// Static exchange evaluation of `mv`: the net material gain for the side
/// to move if all captures on the target square are resolved optimally.
pub fn see(pos: &Position, mv: Move, cfg: &EvalConfig) -> i32 {
    let to = mv.to();
    let us = pos.side_to_move;

    let target_sq = if mv.is_en_passant() {
        Square::from_file_rank(to.file(), mv.from().rank())
    } else {
        to
    };
    let mut occ = pos.all_occupancy;
    let mut attacker_kind = pos.piece_at(mv.from()).map(|p| p.kind).unwrap_or(ColorlessPiece::None);
    let mut side = us;

    let mut gains = Vec::with_capacity(16);
    gains.push(piece_value(cfg, pos.piece_at(target_sq).map(|p| p.kind).unwrap_or(ColorlessPiece::None)));

    occ &= !bit(mv.from());
    if mv.is_en_passant() {
        occ &= !bit(target_sq);
    }

    loop {
        side = side.other();
        let attackers = attackers_to_square(pos, to, occ) & occ;
        let Some((sq, kind)) = least_valuable_attacker(pos, attackers, side) else {
            break;
        };
        gains.push(piece_value(cfg, attacker_kind) - *gains.last().unwrap());
        occ &= !bit(sq);
        attacker_kind = kind;
    }

    // Backward minimax: at each step a side only continues the exchange if
    // doing so is not worse than simply stopping.
    for d in (1..gains.len()).rev() {
        gains[d - 1] = -(-gains[d - 1]).max(gains[d]);
    }
    gains[0]
}

/// Convenience test used by the move-ordering stage: does this capture win
/// material outright (SEE > 0)?
pub fn is_winning_capture(pos: &Position, mv: Move, cfg: &EvalConfig) -> bool {
    see(pos, mv, cfg) > 0
}
