//! Zobrist hashing keys (§3, §4.C). A fixed PRNG seed keeps keys
//! reproducible across runs and across ports of this engine.

use crate::types::{Color, ColorlessPiece, Square};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct ZobristKeys {
    piece_keys: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(1_234_567_890u64);
        let mut piece_keys = [[[0u64; 64]; 6]; 2];
        for color in piece_keys.iter_mut() {
            for kind in color.iter_mut() {
                for sq in kind.iter_mut() {
                    *sq = rng.gen();
                }
            }
        }
        let black_to_move = rng.gen();
        let mut castling = [0u64; 16];
        for c in castling.iter_mut() {
            *c = rng.gen();
        }
        let mut en_passant_file = [0u64; 8];
        for f in en_passant_file.iter_mut() {
            *f = rng.gen();
        }
        ZobristKeys {
            piece_keys,
            black_to_move,
            castling,
            en_passant_file,
        }
    }

    #[inline]
    pub fn piece(&self, color: Color, kind: ColorlessPiece, sq: Square) -> u64 {
        self.piece_keys[color.index()][kind.index()][sq.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> u64 {
        self.black_to_move
    }

    #[inline]
    pub fn castling_rights(&self, rights: u8) -> u64 {
        self.castling[(rights & 0x0F) as usize]
    }

    #[inline]
    pub fn en_passant(&self, file: u8) -> u64 {
        self.en_passant_file[(file & 7) as usize]
    }
}

pub static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);
