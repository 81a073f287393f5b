//! Iterative-deepening alpha-beta search
//!
//! Negamax with a transposition table, capture-first move ordering and a
//! capture-only quiescence extension at the horizon. Moves are applied and
//! undone on one working copy of the board.

use crate::board::{Board, Position};
use crate::eval::{evaluate_for, terminal_score, Heuristics, FORCED_WIN_THRESHOLD};
use crate::movegen::{generate_moves, Move};
use crate::pieces::Player;
use crate::rules::winner;
use crate::strategy::StrategyError;
use crate::tt::{value_from_tt, value_to_tt, Bound, TranspositionTable, TtEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Larger than any reachable score
const INFINITY: i32 = 1_000_000;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Limits for the full search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per move selection, checked between root moves
    pub time_budget_ms: u64,
    /// Hard cap on iterative deepening
    pub max_depth: u8,
    /// Maximum plies of capture-only extension below the horizon
    pub quiescence_depth: u8,
    pub use_transposition_table: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 3_000,
            max_depth: 6,
            quiescence_depth: 4,
            use_transposition_table: true,
        }
    }
}

impl SearchConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = budget.as_millis() as u64;
        self
    }

    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth.max(1);
        self
    }
}

/// Outcome of one move selection
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    /// Score of `best_move` for the side to move
    pub score: i32,
    /// Deepest fully completed iteration
    pub depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
pub struct AlphaBetaAI {
    pub config: SearchConfig,
    pub heuristics: Heuristics,
    tt: TranspositionTable,
    nodes: u64,
    /// Timestamp given to internally generated moves
    stamp: DateTime<Utc>,
    /// Per-ply move lists, reused across nodes
    buffers: Vec<Vec<Move>>,
}

impl AlphaBetaAI {
    pub fn new(config: SearchConfig, heuristics: Heuristics) -> Self {
        Self {
            config,
            heuristics,
            tt: TranspositionTable::new(),
            nodes: 0,
            stamp: Utc::now(),
            buffers: Vec::new(),
        }
    }

    /// Choose a move for the side that owns `moves`.
    ///
    /// Deepens one ply at a time until the time budget or the depth cap is
    /// reached, or a forced win is found. An iteration interrupted by the
    /// clock is discarded; depth 1 always completes.
    pub fn select_move(&mut self, board: &Board, moves: &[Move]) -> Result<SearchResult, StrategyError> {
        let side = moves.first().ok_or(StrategyError::NoLegalMoves)?.mover;
        let start = Instant::now();
        let deadline = start + self.config.time_budget();
        self.reset();

        let mut root = moves.to_vec();
        order_moves(&mut root, None);
        let mut work = *board;
        let mut best = (root[0], 0);
        let mut completed = 0;

        for depth in 1..=self.config.max_depth.max(1) {
            let limit = (depth > 1).then_some(deadline);
            let Some((mv, score)) = self.search_root(&mut work, side, &root, depth, limit) else {
                tracing::debug!(depth, "iteration abandoned at time limit");
                break;
            };
            best = (mv, score);
            completed = depth;
            tracing::debug!(depth, score, nodes = self.nodes, best = %mv, "completed depth");

            if score >= FORCED_WIN_THRESHOLD {
                break;
            }
            if let Some(i) = root.iter().position(|m| m.same_squares(&mv)) {
                root[..=i].rotate_right(1);
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        let result = SearchResult {
            best_move: best.0,
            score: best.1,
            depth: completed,
            nodes: self.nodes,
            elapsed: start.elapsed(),
        };
        tracing::debug!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            elapsed_ms = result.elapsed.as_millis() as u64,
            tt_entries = self.tt.len(),
            "search finished"
        );
        Ok(result)
    }

    /// Search exactly `depth` plies with no time limit. Returns the chosen move and its score.
    pub fn search_depth(&mut self, board: &Board, moves: &[Move], depth: u8) -> Result<(Move, i32), StrategyError> {
        let side = moves.first().ok_or(StrategyError::NoLegalMoves)?.mover;
        self.reset();
        let mut root = moves.to_vec();
        order_moves(&mut root, None);
        let mut work = *board;
        let best = self.search_root(&mut work, side, &root, depth.max(1), None);
        best.ok_or(StrategyError::NoLegalMoves)
    }

    /// Nodes visited by the last search
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn reset(&mut self) {
        self.tt.clear();
        self.nodes = 0;
        self.stamp = Utc::now();
    }

    // ========================================================================
    // ROOT
    // ========================================================================

    /// One full-width iteration. `None` if the deadline passed before every
    /// root move was searched.
    fn search_root(
        &mut self,
        board: &mut Board,
        side: Player,
        moves: &[Move],
        depth: u8,
        deadline: Option<Instant>,
    ) -> Option<(Move, i32)> {
        let mut alpha = -INFINITY;
        let mut best: Option<(Move, i32)> = None;

        for mv in moves {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return None;
            }
            let previous = board.apply(mv.from, mv.to);
            let score = -self.negamax(board, side.opponent(), depth - 1, 1, -INFINITY, -alpha);
            board.undo(mv.from, mv.to, previous);

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*mv, score));
            }
            alpha = alpha.max(score);
        }
        best
    }

    // ========================================================================
    // NEGAMAX WITH ALPHA-BETA
    // ========================================================================

    fn negamax(&mut self, board: &mut Board, side: Player, depth: u8, ply: u32, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes += 1;

        if depth == 0 {
            return self.quiescence(board, side, ply, alpha, beta, 0);
        }

        let key = board.hash_for(side);
        let mut hash_move = None;
        if self.config.use_transposition_table {
            if let Some(entry) = self.tt.probe(key) {
                hash_move = entry.best;
                if entry.depth >= depth {
                    let value = value_from_tt(entry.value, ply);
                    match entry.bound {
                        Bound::Exact => return value,
                        Bound::Lower => alpha = alpha.max(value),
                        Bound::Upper => beta = beta.min(value),
                    }
                    if alpha >= beta {
                        return value;
                    }
                }
            }
        }

        // Terminal check precedes the depth check
        if let Some(w) = winner(board, side.opponent()) {
            return terminal_score(w, side, ply);
        }

        let mut moves = self.take_buffer(ply);
        generate_moves(board, side, self.stamp, &mut moves);
        if moves.is_empty() {
            self.return_buffer(ply, moves);
            return terminal_score(side.opponent(), side, ply);
        }
        order_moves(&mut moves, hash_move);

        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut best = -INFINITY;
        let mut best_move = None;

        for mv in moves.iter() {
            let previous = board.apply(mv.from, mv.to);
            let score = -self.negamax(board, side.opponent(), depth - 1, ply + 1, -beta, -alpha);
            board.undo(mv.from, mv.to, previous);

            if score > best {
                best = score;
                best_move = Some((mv.from, mv.to));
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        self.return_buffer(ply, moves);

        if self.config.use_transposition_table {
            let bound = if best <= alpha_orig {
                Bound::Upper
            } else if best >= beta_orig {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.tt.store(
                key,
                TtEntry {
                    depth,
                    value: value_to_tt(best, ply),
                    bound,
                    best: best_move,
                },
            );
        }
        best
    }

    // ========================================================================
    // QUIESCENCE
    // ========================================================================

    /// Capture-only search below the horizon. The static score stands in for
    /// declining every capture.
    fn quiescence(&mut self, board: &mut Board, side: Player, ply: u32, mut alpha: i32, beta: i32, qdepth: u8) -> i32 {
        self.nodes += 1;

        if let Some(w) = winner(board, side.opponent()) {
            return terminal_score(w, side, ply);
        }

        let stand_pat = evaluate_for(board, side, &self.heuristics);
        if qdepth >= self.config.quiescence_depth || stand_pat >= beta {
            return stand_pat;
        }
        alpha = alpha.max(stand_pat);
        let mut best = stand_pat;

        let mut moves = self.take_buffer(ply);
        generate_moves(board, side, self.stamp, &mut moves);
        moves.retain(|m| m.captured);
        order_moves(&mut moves, None);

        for mv in moves.iter() {
            let previous = board.apply(mv.from, mv.to);
            let score = -self.quiescence(board, side.opponent(), ply + 1, -beta, -alpha, qdepth + 1);
            board.undo(mv.from, mv.to, previous);

            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        self.return_buffer(ply, moves);
        best
    }

    // ========================================================================
    // MOVE BUFFERS
    // ========================================================================

    fn take_buffer(&mut self, ply: u32) -> Vec<Move> {
        let ply = ply as usize;
        if self.buffers.len() <= ply {
            self.buffers.resize_with(ply + 1, Vec::new);
        }
        let mut buffer = std::mem::take(&mut self.buffers[ply]);
        buffer.clear();
        buffer
    }

    fn return_buffer(&mut self, ply: u32, buffer: Vec<Move>) {
        self.buffers[ply as usize] = buffer;
    }
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Order moves for search: the hinted move first, then captures, then by
/// destination distance to the centre. Stable for equal keys.
pub fn order_moves(moves: &mut [Move], first: Option<(Position, Position)>) {
    moves.sort_by_key(|m| {
        let hinted = first == Some((m.from, m.to));
        (!hinted, !m.captured, m.to.center_distance2())
    });
}

// ============================================================================
// TESTS
// ============================================================================
