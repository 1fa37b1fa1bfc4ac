//! Property-based tests exercising invariants that must hold for any legal
//! move sequence, not just the handful of positions covered elsewhere.

use corvus::board::Board;
use corvus::eval::{self, EvalConfig};
use corvus::see;
use corvus::tt::{Bound, TranspositionTable};
use corvus::types::ColorlessPiece;
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;
use rand::rngs::StdRng;

fn play_random_moves(board: &mut Board, rng: &mut StdRng, n: usize) {
    for _ in 0..n {
        let moves = board.current().generate_legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.make_move(mv);
    }
}

proptest! {
    /// make_move followed by unmake_move restores the zobrist key exactly.
    #[test]
    fn make_unmake_restores_hash(seed in any::<u64>(), num_moves in 1..20usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let initial_key = board.current().zobrist_key;

        let mut made = 0;
        for _ in 0..num_moves {
            let moves = board.current().generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            board.make_move(mv);
            made += 1;
        }
        for _ in 0..made {
            board.unmake_move();
        }
        prop_assert_eq!(board.current().zobrist_key, initial_key);
    }

    /// SEE never reports a gain larger than the value of the piece captured.
    #[test]
    fn see_is_bounded_by_victim_value(seed in any::<u64>(), num_moves in 0..15usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        play_random_moves(&mut board, &mut rng, num_moves);

        let cfg = EvalConfig::default();
        let pos = board.current();
        for mv in pos.generate_legal_captures() {
            if let Some(victim) = pos.piece_at(mv.to()) {
                if victim.kind == ColorlessPiece::None {
                    continue;
                }
                let victim_value = cfg.material_mg[victim.kind.index()];
                let score = see::see(pos, mv, &cfg);
                prop_assert!(score <= victim_value + 1, "see {} exceeds victim value {}", score, victim_value);
            }
        }
    }

    /// Evaluation never drifts into an unreasonable range for a handful of
    /// random plies from the start position.
    #[test]
    fn evaluation_stays_bounded(seed in any::<u64>(), num_moves in 0..30usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        play_random_moves(&mut board, &mut rng, num_moves);

        let cfg = EvalConfig::default();
        let (score, _, _) = eval::evaluate(board.current(), &cfg);
        prop_assert!(score.abs() < 10_000, "evaluation {} is unreasonably large", score);
    }

    /// Legal moves never leave the mover's own king in check.
    #[test]
    fn legal_moves_never_leave_own_king_in_check(seed in any::<u64>(), num_moves in 0..10usize) {
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);
        play_random_moves(&mut board, &mut rng, num_moves);

        let mover = board.current().side_to_move;
        for mv in board.current().generate_legal_moves() {
            board.make_move(mv);
            prop_assert!(!board.current().is_square_attacked_by(
                board.current().king_square(mover),
                mover.other(),
            ));
            board.unmake_move();
        }
    }

    /// The transposition table returns what was last stored for a key, as
    /// long as no collision with a different key intervened.
    #[test]
    fn tt_store_then_probe_round_trips(key in any::<u64>(), depth in 0..64i32, score in -20_000..20_000i32) {
        let mut tt = TranspositionTable::new(1);
        tt.store(key, 0, depth, score, Bound::Exact, corvus::moves::Move::NULL);
        if let Some(entry) = tt.probe(key, 0) {
            prop_assert_eq!(entry.depth, depth);
        }
    }
}
