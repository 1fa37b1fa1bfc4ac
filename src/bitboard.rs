//! Bitboard primitives and static board geometry tables (§4.A).
//!
//! Canonical square order: A8 = 0, H8 = 7, A7 = 8, ..., A1 = 56, H1 = 63.

use crate::types::{Color, Square};
use once_cell::sync::Lazy;

pub type Bitboard = u64;

pub const FILE_A: Bitboard = 0x0101_0101_0101_0101;
pub const FILE_H: Bitboard = FILE_A << 7;
pub const RANK_8: Bitboard = 0xFF;
pub const RANK_1: Bitboard = 0xFF << 56;
pub const NOT_FILE_A: Bitboard = !FILE_A;
pub const NOT_FILE_H: Bitboard = !FILE_H;
pub const NOT_FILE_AB: Bitboard = !(FILE_A | (FILE_A << 1));
pub const NOT_FILE_GH: Bitboard = !(FILE_H | (FILE_H >> 1));

#[inline]
pub const fn file_mask(file: u8) -> Bitboard {
    FILE_A << file
}

#[inline]
pub const fn rank_mask(rank: u8) -> Bitboard {
    RANK_8 << (rank * 8)
}

#[inline]
pub const fn popcount(bb: Bitboard) -> u32 {
    bb.count_ones()
}

/// Index of the least-significant set bit, or `Square::ILLEGAL` if `bb == 0`.
#[inline]
pub fn first_set_square(bb: Bitboard) -> Square {
    if bb == 0 {
        Square::ILLEGAL
    } else {
        Square::new(bb.trailing_zeros() as u8)
    }
}

/// Returns the least-significant set square and clears it from `bb`.
#[inline]
pub fn pop_first_set_square(bb: &mut Bitboard) -> Square {
    let sq = first_set_square(*bb);
    if sq.is_valid() {
        *bb &= *bb - 1;
    }
    sq
}

#[inline]
pub const fn set_bit(bb: Bitboard, sq: Square) -> Bitboard {
    bb | (1u64 << sq.0)
}

#[inline]
pub const fn clear_bit(bb: Bitboard, sq: Square) -> Bitboard {
    bb & !(1u64 << sq.0)
}

#[inline]
pub const fn bit(sq: Square) -> Bitboard {
    1u64 << sq.0
}

fn chebyshev(a: Square, b: Square) -> u32 {
    let (af, ar) = (a.file() as i32, a.rank() as i32);
    let (bf, br) = (b.file() as i32, b.rank() as i32);
    (af - bf).unsigned_abs().max((ar - br).unsigned_abs())
}

struct Geometry {
    distance: [[u8; 64]; 64],
    corner_distance: [u8; 64],
    central_distance: [u8; 64],
    inner_ring: [Bitboard; 64],
    outer_ring: [Bitboard; 64],
    pawn_attacks: [[Bitboard; 64]; 2],
    passed_pawn_mask: [[Bitboard; 64]; 2],
    free_pawn_mask: [[Bitboard; 64]; 2],
    pawn_shield_mask: [[Bitboard; 64]; 2],
    knight_attacks: [Bitboard; 64],
    king_attacks: [Bitboard; 64],
    edge_squares: Bitboard,
    square_color: [Bitboard; 2],
}

fn build_geometry() -> Geometry {
    let corners = [Square::new(0), Square::new(7), Square::new(56), Square::new(63)];
    let center = [27u8, 28, 35, 36].map(Square::new);

    let mut distance = [[0u8; 64]; 64];
    let mut corner_distance = [0u8; 64];
    let mut central_distance = [0u8; 64];
    let mut inner_ring = [0u64; 64];
    let mut outer_ring = [0u64; 64];
    let mut pawn_attacks = [[0u64; 64]; 2];
    let mut passed_pawn_mask = [[0u64; 64]; 2];
    let mut free_pawn_mask = [[0u64; 64]; 2];
    let mut pawn_shield_mask = [[0u64; 64]; 2];
    let mut knight_attacks = [0u64; 64];
    let mut king_attacks = [0u64; 64];
    let mut edge_squares = 0u64;
    let mut square_color = [0u64; 2];

    for i in 0..64u8 {
        let sq = Square::new(i);
        for j in 0..64u8 {
            distance[i as usize][j as usize] = chebyshev(sq, Square::new(j)) as u8;
        }
        corner_distance[i as usize] = corners.iter().map(|&c| chebyshev(sq, c) as u8).min().unwrap();
        central_distance[i as usize] = center.iter().map(|&c| chebyshev(sq, c) as u8).min().unwrap();

        let file = sq.file() as i32;
        let rank = sq.rank() as i32;
        if file == 0 || file == 7 || rank == 0 || rank == 7 {
            edge_squares |= bit(sq);
        }
        square_color[((file + rank) % 2) as usize] |= bit(sq);

        // King rings.
        let mut inner = 0u64;
        let mut outer = 0u64;
        for df in -2i32..=2 {
            for dr in -2i32..=2 {
                if df == 0 && dr == 0 {
                    continue;
                }
                let f = file + df;
                let r = rank + dr;
                if !(0..8).contains(&f) || !(0..8).contains(&r) {
                    continue;
                }
                let dest = Square::from_file_rank(f as u8, r as u8);
                if df.abs() <= 1 && dr.abs() <= 1 {
                    inner |= bit(dest);
                } else {
                    outer |= bit(dest);
                }
            }
        }
        inner_ring[i as usize] = inner;
        outer_ring[i as usize] = outer;

        // Knight.
        let knight_deltas = [
            (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
        ];
        let mut katt = 0u64;
        for (df, dr) in knight_deltas {
            let f = file + df;
            let r = rank + dr;
            if (0..8).contains(&f) && (0..8).contains(&r) {
                katt |= bit(Square::from_file_rank(f as u8, r as u8));
            }
        }
        knight_attacks[i as usize] = katt;

        // King step attacks.
        let mut kgatt = 0u64;
        for df in -1i32..=1 {
            for dr in -1i32..=1 {
                if df == 0 && dr == 0 {
                    continue;
                }
                let f = file + df;
                let r = rank + dr;
                if (0..8).contains(&f) && (0..8).contains(&r) {
                    kgatt |= bit(Square::from_file_rank(f as u8, r as u8));
                }
            }
        }
        king_attacks[i as usize] = kgatt;

        // Pawn attacks, per color. White moves toward rank index decreasing (A8=rank0).
        for (ci, dr) in [(0usize, -1i32), (1usize, 1i32)] {
            let mut patt = 0u64;
            let r = rank + dr;
            if (0..8).contains(&r) {
                for df in [-1i32, 1] {
                    let f = file + df;
                    if (0..8).contains(&f) {
                        patt |= bit(Square::from_file_rank(f as u8, r as u8));
                    }
                }
            }
            pawn_attacks[ci][i as usize] = patt;
        }

        // Passed/free/shield masks: White advances toward rank 0, Black toward rank 7.
        for (ci, dir) in [(0usize, -1i32), (1usize, 1i32)] {
            let mut passed = 0u64;
            let mut free = 0u64;
            let mut shield = 0u64;
            let mut r = rank + dir;
            let mut shield_r = rank + dir;
            let mut shield_steps = 0;
            while (0..8).contains(&r) {
                for df in [-1i32, 0, 1] {
                    let f = file + df;
                    if (0..8).contains(&f) {
                        let m = bit(Square::from_file_rank(f as u8, r as u8));
                        passed |= m;
                        if df == 0 {
                            free |= m;
                        }
                    }
                }
                r += dir;
            }
            while (0..8).contains(&shield_r) && shield_steps < 2 {
                shield |= bit(Square::from_file_rank(file as u8, shield_r as u8));
                if file > 0 {
                    shield |= bit(Square::from_file_rank((file - 1) as u8, shield_r as u8));
                }
                if file < 7 {
                    shield |= bit(Square::from_file_rank((file + 1) as u8, shield_r as u8));
                }
                shield_r += dir;
                shield_steps += 1;
            }
            passed_pawn_mask[ci][i as usize] = passed;
            free_pawn_mask[ci][i as usize] = free;
            pawn_shield_mask[ci][i as usize] = shield;
        }
    }

    Geometry {
        distance,
        corner_distance,
        central_distance,
        inner_ring,
        outer_ring,
        pawn_attacks,
        passed_pawn_mask,
        free_pawn_mask,
        pawn_shield_mask,
        knight_attacks,
        king_attacks,
        edge_squares,
        square_color,
    }
}

static GEOMETRY: Lazy<Geometry> = Lazy::new(build_geometry);

#[inline]
pub fn distance(a: Square, b: Square) -> u32 {
    GEOMETRY.distance[a.index()][b.index()] as u32
}

#[inline]
pub fn corner_distance(sq: Square) -> u32 {
    GEOMETRY.corner_distance[sq.index()] as u32
}

#[inline]
pub fn central_distance(sq: Square) -> u32 {
    GEOMETRY.central_distance[sq.index()] as u32
}

#[inline]
pub fn inner_ring(sq: Square) -> Bitboard {
    GEOMETRY.inner_ring[sq.index()]
}

#[inline]
pub fn outer_ring(sq: Square) -> Bitboard {
    GEOMETRY.outer_ring[sq.index()]
}

#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    GEOMETRY.pawn_attacks[color.index()][sq.index()]
}

#[inline]
pub fn passed_pawn_mask(color: Color, sq: Square) -> Bitboard {
    GEOMETRY.passed_pawn_mask[color.index()][sq.index()]
}

#[inline]
pub fn free_pawn_mask(color: Color, sq: Square) -> Bitboard {
    GEOMETRY.free_pawn_mask[color.index()][sq.index()]
}

#[inline]
pub fn pawn_shield_mask(color: Color, sq: Square) -> Bitboard {
    GEOMETRY.pawn_shield_mask[color.index()][sq.index()]
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    GEOMETRY.knight_attacks[sq.index()]
}

#[inline]
pub fn king_step_attacks(sq: Square) -> Bitboard {
    GEOMETRY.king_attacks[sq.index()]
}

#[inline]
pub fn edge_squares() -> Bitboard {
    GEOMETRY.edge_squares
}

#[inline]
pub fn square_color_mask(light: bool) -> Bitboard {
    GEOMETRY.square_color[if light { 1 } else { 0 }]
}
