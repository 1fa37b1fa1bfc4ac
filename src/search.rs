//! Iterative-deepening principal-variation search (§4.G): negamax with
//! alpha-beta, transposition cutoffs, null-move pruning, static/reverse
//! futility pruning, internal iterative deepening, late-move reductions
//! and pruning, a PVS re-search window, and quiescence (with evasion
//! search when in check) at the leaves.

use crate::board::Board;
use crate::eval::{self, EvalConfig};
use crate::moves::Move;
use crate::ordering::{self, OrderingTables};
use crate::see;
use crate::time_control::TimeManager;
use crate::tt::{Bound, TranspositionTable, MATE_SCORE, MATE_THRESHOLD};
use crate::types::{Color, ColorlessPiece};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const MAX_PLY: usize = 128;
const INF: i32 = MATE_SCORE + 1;

// Static/reverse futility pruning and late-move pruning only fire close to
// the leaves; beyond this remaining depth the static eval is too noisy a
// signal to skip a move outright.
const FUTILITY_DEPTH: i32 = 8;
const FUTILITY_MARGIN_PER_PLY: i32 = 150;

pub struct SearchOutcome {
    pub best_move: Move,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

pub struct Searcher<'a> {
    board: &'a mut Board,
    tt: &'a mut TranspositionTable,
    tables: OrderingTables,
    cfg: &'a EvalConfig,
    time: TimeManager,
    nodes: u64,
    stopped: bool,
    stop_signal: Arc<AtomicBool>,
    pv: [[Move; MAX_PLY]; MAX_PLY],
    pv_len: [usize; MAX_PLY],
    // Per-ply static eval, recorded only when the side to move isn't in
    // check; `i32::MIN` marks a ply where no static eval was taken. Used to
    // detect a static score that declined over the last two same-color
    // plies, which biases late-move reductions.
    static_eval_stack: [i32; MAX_PLY],
    root_moves: Option<Vec<Move>>,
}

impl<'a> Searcher<'a> {
    pub fn new(board: &'a mut Board, tt: &'a mut TranspositionTable, cfg: &'a EvalConfig, time: TimeManager) -> Searcher<'a> {
        Searcher::with_stop_signal(board, tt, cfg, time, Arc::new(AtomicBool::new(false)))
    }

    /// Like `new`, but the search also aborts as soon as `stop_signal` is
    /// set from another thread (the UCI `stop` command).
    pub fn with_stop_signal(
        board: &'a mut Board,
        tt: &'a mut TranspositionTable,
        cfg: &'a EvalConfig,
        time: TimeManager,
        stop_signal: Arc<AtomicBool>,
    ) -> Searcher<'a> {
        Searcher {
            board,
            tt,
            tables: OrderingTables::new(),
            cfg,
            time,
            nodes: 0,
            stopped: false,
            stop_signal,
            pv: [[Move::NULL; MAX_PLY]; MAX_PLY],
            pv_len: [0; MAX_PLY],
            static_eval_stack: [i32::MIN; MAX_PLY],
            root_moves: None,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Legal moves in the current root position, for UCI to intersect
    /// against a `go searchmoves` list before calling `restrict_root_moves`.
    pub fn board_moves(&self) -> Vec<Move> {
        self.board.current().generate_legal_moves()
    }

    /// Restricts the root move list to `moves` (UCI `go searchmoves`). If
    /// the supplied list shares no move with the position's legal moves
    /// the restriction is ignored rather than searching nothing.
    pub fn restrict_root_moves(&mut self, moves: Vec<Move>) {
        self.root_moves = Some(moves);
    }

    /// Runs iterative deepening up to `max_depth`, calling `on_iteration`
    /// after each completed depth (for UCI `info` lines). Stops early on
    /// the time manager's hard limit or when `max_depth` is reached.
    pub fn iterative_deepening(&mut self, max_depth: u32, mut on_iteration: impl FnMut(&SearchOutcome)) -> SearchOutcome {
        self.tt.new_generation();
        let mut best = SearchOutcome {
            best_move: Move::NULL,
            score: 0,
            depth: 0,
            nodes: 0,
            pv: Vec::new(),
        };

        let hard_cap = self.time.depth_limit().unwrap_or(max_depth).min(max_depth).max(1);

        for depth in 1..=hard_cap {
            let iter_start = self.time.elapsed();
            let score = self.search_root(depth as i32);
            if self.stopped && depth > 1 {
                break;
            }

            let pv = self.pv[0][..self.pv_len[0]].to_vec();
            best = SearchOutcome {
                best_move: pv.first().copied().unwrap_or(best.best_move),
                score,
                depth,
                nodes: self.nodes,
                pv,
            };
            on_iteration(&best);

            let last_iter_time = self.time.elapsed().saturating_sub(iter_start);
            if self.stopped || !self.time.have_time_for_next_iteration(score, last_iter_time) {
                break;
            }
            if score.abs() >= MATE_THRESHOLD {
                break;
            }
        }
        best
    }

    fn search_root(&mut self, depth: i32) -> i32 {
        self.pv_len[0] = 0;
        self.negamax(depth, -INF, INF, 0, true)
    }

    fn check_time(&mut self) {
        if self.nodes % 2048 == 0 && (self.time.must_stop(self.nodes) || self.stop_signal.load(Ordering::Relaxed)) {
            self.stopped = true;
        }
    }

    fn futility_margin(depth: i32) -> i32 {
        FUTILITY_MARGIN_PER_PLY * depth.max(1)
    }

    fn is_lone_king_endgame(&self) -> bool {
        let pos = self.board.current();
        for side in 0..2 {
            let non_pawn = pos.pieces[side][ColorlessPiece::Knight.index()]
                | pos.pieces[side][ColorlessPiece::Bishop.index()]
                | pos.pieces[side][ColorlessPiece::Rook.index()]
                | pos.pieces[side][ColorlessPiece::Queen.index()];
            if non_pawn == 0 {
                return true;
            }
        }
        false
    }

    fn negamax(&mut self, mut depth: i32, mut alpha: i32, beta: i32, ply: usize, allow_null: bool) -> i32 {
        self.pv_len[ply] = ply;
        if self.stopped {
            return 0;
        }
        self.nodes += 1;
        self.check_time();
        if self.stopped && ply > 0 {
            return 0;
        }

        if ply > 0 {
            alpha = alpha.max(-MATE_SCORE + ply as i32);
            let beta_adj = beta.min(MATE_SCORE - ply as i32);
            if alpha >= beta_adj {
                return alpha;
            }
            if self.board.is_draw() {
                return 0;
            }
        }

        if depth <= 0 || ply >= MAX_PLY - 1 {
            return self.quiescence(alpha, beta, ply);
        }

        let is_pv = beta - alpha > 1;
        let near_mate = alpha.abs() >= MATE_THRESHOLD || beta.abs() >= MATE_THRESHOLD;

        let key = self.board.current().zobrist_key;
        let in_check = self.board.current().in_check(self.board.current().side_to_move);
        if in_check {
            depth += 1;
        }

        let mut tt_move = None;
        if let Some(probe) = self.tt.probe(key, ply as i32) {
            tt_move = Some(probe.best_move);
            if probe.depth >= depth && ply > 0 {
                if let Some(score) = probe.cutoff(alpha, beta) {
                    return score;
                }
            }
        }

        let (static_eval, _drawn, _phase) = eval::evaluate(self.board.current(), self.cfg);
        self.static_eval_stack[ply] = if in_check { i32::MIN } else { static_eval };

        // Null-move pruning: skip a move and see if the opponent still
        // can't beat beta, implying our position is comfortably ahead.
        if allow_null && !in_check && depth >= 3 && static_eval >= beta && self.has_non_pawn_material() {
            let reduction = 3 + ((static_eval - beta) / 180).clamp(0, 3);
            self.board.make_null_move();
            let score = -self.negamax(depth - 1 - reduction, -beta, -beta + 1, ply + 1, false);
            self.board.unmake_move();
            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
        }

        // Static/reverse futility pruning: if the static eval already beats
        // beta by more than a depth-scaled margin, assume a real move would
        // too and cut without searching further.
        if ply > 0
            && !in_check
            && !is_pv
            && !near_mate
            && depth < FUTILITY_DEPTH
            && !self.is_lone_king_endgame()
            && static_eval - Self::futility_margin(depth) >= beta
        {
            return beta;
        }

        // Internal iterative deepening: no TT move to try first, so do a
        // shallow search of this same node to seed one before ordering.
        if tt_move.is_none() && is_pv && depth > 2 {
            self.negamax(depth - 2, alpha, beta, ply, allow_null);
            if let Some(probe) = self.tt.probe(key, ply as i32) {
                if !probe.best_move.is_null() {
                    tt_move = Some(probe.best_move);
                }
            }
        }

        let mut moves = self.board.current().generate_legal_moves();
        if ply == 0 {
            if let Some(allowed) = &self.root_moves {
                if !allowed.is_empty() {
                    let filtered: Vec<Move> = moves.iter().copied().filter(|m| allowed.iter().any(|a| a.identity() == m.identity())).collect();
                    if !filtered.is_empty() {
                        moves = filtered;
                    }
                }
            }
        }
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply as i32 } else { 0 };
        }

        let mut scored = ordering::score_moves(self.board.current(), &moves, tt_move, ply, &self.tables, self.cfg);

        let mut best_score = -INF;
        let mut best_move = Move::NULL;
        let mut bound = Bound::UpperBound;
        let mut moves_searched = 0;
        let mut quiet_count: i32 = 0;

        let declined = ply >= 2
            && self.static_eval_stack[ply] != i32::MIN
            && self.static_eval_stack[ply - 2] != i32::MIN
            && self.static_eval_stack[ply] < self.static_eval_stack[ply - 2];

        for i in 0..scored.len() {
            let Some(idx) = ordering::pick_best(&mut scored, i) else { break };
            let mv = scored[idx].mv;

            let is_tactical = mv.is_capture() || mv.is_promotion();
            if !is_tactical {
                quiet_count += 1;
            }
            let is_killer = !is_tactical && self.tables.is_killer(ply, mv).is_some();
            let is_castle = mv.is_castling();
            let is_seventh_push = is_pawn_push_to_seventh(mv, self.board.current().side_to_move);

            // Late-move pruning and move-level futility: only quiet moves
            // that aren't killers, castles, or pushes to the seventh rank,
            // and only away from check/PV/near-mate/bare-king nodes.
            let prunable = moves_searched > 0 && !is_tactical && !is_killer && !is_castle && !is_seventh_push && !in_check && !is_pv && !near_mate && !self.is_lone_king_endgame();

            if prunable && depth < FUTILITY_DEPTH {
                if quiet_count > depth * depth + 3 {
                    continue;
                }
                if static_eval + Self::futility_margin(depth) < alpha {
                    continue;
                }
            }

            self.board.make_move(mv);
            let gives_check = self.board.current().in_check(self.board.current().side_to_move);

            let score = if moves_searched == 0 {
                -self.negamax(depth - 1, -beta, -alpha, ply + 1, true)
            } else {
                let reduction = if prunable && !gives_check { late_move_reduction(depth, quiet_count, declined) } else { 0 };
                let reduced = (depth - 1 - reduction).max(0);
                let mut s = -self.negamax(reduced, -alpha - 1, -alpha, ply + 1, true);
                if s > alpha && reduction > 0 {
                    s = -self.negamax(depth - 1, -alpha - 1, -alpha, ply + 1, true);
                }
                if s > alpha && s < beta {
                    s = -self.negamax(depth - 1, -beta, -alpha, ply + 1, true);
                }
                s
            };
            self.board.unmake_move();
            moves_searched += 1;

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    alpha = score;
                    bound = Bound::Exact;
                    self.update_pv(ply, mv);
                }
            }

            if alpha >= beta {
                bound = Bound::LowerBound;
                if !mv.is_capture() {
                    self.tables.record_killer(ply, mv);
                    let color_idx = self.board.current().side_to_move.other().index();
                    self.tables.record_history(color_idx, mv, depth * depth);
                }
                break;
            }
        }

        self.tt.store(key, ply as i32, depth, best_score, bound, best_move);
        best_score
    }

    fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.nodes += 1;
        self.check_time();
        if self.stopped {
            return 0;
        }
        self.pv_len[ply] = ply;

        let in_check = self.board.current().in_check(self.board.current().side_to_move);

        let stand_pat = if in_check {
            None
        } else {
            let (score, _drawn, _phase) = eval::evaluate(self.board.current(), self.cfg);
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
            Some(score)
        };

        if ply >= MAX_PLY - 1 {
            return stand_pat.unwrap_or(alpha);
        }

        // In check there's no stand-pat: the side to move must resolve the
        // check, so search every evasion rather than only captures.
        let moves = if in_check {
            self.board.current().generate_legal_moves()
        } else {
            let mut captures = self.board.current().generate_legal_captures();
            captures.retain(|&mv| see::see(self.board.current(), mv, self.cfg) >= 0);
            captures
        };

        if in_check && moves.is_empty() {
            return -MATE_SCORE + ply as i32;
        }

        let mut scored = ordering::score_moves(self.board.current(), &moves, None, ply, &self.tables, self.cfg);

        for i in 0..scored.len() {
            let Some(idx) = ordering::pick_best(&mut scored, i) else { break };
            let mv = scored[idx].mv;
            self.board.make_move(mv);
            let score = -self.quiescence(-beta, -alpha, ply + 1);
            self.board.unmake_move();

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
                self.update_pv(ply, mv);
            }
        }
        alpha
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        self.pv[ply][ply] = mv;
        let next_len = self.pv_len[ply + 1];
        for i in (ply + 1)..next_len {
            self.pv[ply][i] = self.pv[ply + 1][i];
        }
        self.pv_len[ply] = next_len.max(ply + 1);
    }

    fn has_non_pawn_material(&self) -> bool {
        let pos = self.board.current();
        let us = pos.side_to_move.index();
        pos.pieces[us][ColorlessPiece::Knight.index()] | pos.pieces[us][ColorlessPiece::Bishop.index()] | pos.pieces[us][ColorlessPiece::Rook.index()] | pos.pieces[us][ColorlessPiece::Queen.index()] != 0
    }
}

/// True for a pawn push landing on the mover's seventh rank (one step from
/// promotion). Square index 0 is a8, so White promotes at rank index 0 and
/// Black at rank index 7.
fn is_pawn_push_to_seventh(mv: Move, mover: Color) -> bool {
    if !mv.is_pawn_move() || mv.is_capture() {
        return false;
    }
    match mover {
        Color::White => mv.to().rank() == 1,
        Color::Black => mv.to().rank() == 6,
    }
}

/// `scale * log2(quiet_move_number) * log2(depth_remaining) / 128`, bumped
/// by one ply when the static eval has declined over the last two
/// same-color plies.
fn late_move_reduction(depth: i32, quiet_move_number: i32, declined: bool) -> i32 {
    if depth < 2 || quiet_move_number < 1 {
        return 0;
    }
    const SCALE: f64 = 70.0;
    let log_qmn = (quiet_move_number as f64).log2();
    let log_depth = (depth as f64).log2();
    let mut r = ((SCALE * log_qmn * log_depth) / 128.0).floor() as i32;
    if declined {
        r += 1;
    }
    r.max(0)
}
