//! Connectivity and terminal-state detection

use crate::board::{Board, Position, CELL_COUNT};
use crate::movegen::has_legal_move;
use crate::pieces::{Piece, Player};
use serde::{Deserialize, Serialize};

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlackWins,
    WhiteWins,
}

impl GameResult {
    pub fn win_for(player: Player) -> Self {
        match player {
            Player::Black => GameResult::BlackWins,
            Player::White => GameResult::WhiteWins,
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Ongoing => None,
            GameResult::BlackWins => Some(Player::Black),
            GameResult::WhiteWins => Some(Player::White),
        }
    }

    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }
}

// ============================================================================
// CONNECTIVITY
// ============================================================================

/// Size of the 8-connected group containing `start`, marking it in `visited`
fn flood(board: &Board, start: Position, target: Piece, visited: &mut [bool; CELL_COUNT]) -> usize {
    let mut stack = vec![start];
    visited[start.index()] = true;
    let mut size = 0;
    while let Some(current) = stack.pop() {
        size += 1;
        for next in current.neighbors() {
            if board.get(next) == target && !visited[next.index()] {
                visited[next.index()] = true;
                stack.push(next);
            }
        }
    }
    size
}

/// Whether all of `player`'s pieces form one group under king-move adjacency.
///
/// A single piece is connected, and so (vacuously) is a side with no pieces.
pub fn is_connected(board: &Board, player: Player) -> bool {
    let total = board.count(player) as usize;
    if total <= 1 {
        return true;
    }
    let start = match board.pieces(player).next() {
        Some(p) => p,
        None => return true,
    };
    let mut visited = [false; CELL_COUNT];
    flood(board, start, Piece::from(player), &mut visited) == total
}

/// Size of `player`'s largest connected group (0 with no pieces)
pub fn largest_group(board: &Board, player: Player) -> usize {
    let target = Piece::from(player);
    let mut visited = [false; CELL_COUNT];
    let mut best = 0;
    for pos in board.pieces(player) {
        if !visited[pos.index()] {
            best = best.max(flood(board, pos, target, &mut visited));
        }
    }
    best
}

/// Number of ordered same-color neighbour pairs (each adjacency counted from both ends)
pub fn adjacency_count(board: &Board, player: Player) -> usize {
    let target = Piece::from(player);
    board
        .pieces(player)
        .map(|pos| pos.neighbors().filter(|&n| board.get(n) == target).count())
        .sum()
}

// ============================================================================
// TERMINAL DETECTION
// ============================================================================

/// Winner after `last_mover` produced `board`, if any.
///
/// Priority: both connected credits the mover; otherwise a single connected
/// side wins; otherwise a side reduced to one piece wins.
pub fn winner(board: &Board, last_mover: Player) -> Option<Player> {
    let black = is_connected(board, Player::Black);
    let white = is_connected(board, Player::White);
    match (black, white) {
        (true, true) => return Some(last_mover),
        (true, false) => return Some(Player::Black),
        (false, true) => return Some(Player::White),
        (false, false) => {}
    }
    // A lone piece is already connected above; listed for the rule order
    Player::ALL.into_iter().find(|&p| board.count(p) == 1)
}

/// Full result after `last_mover` moved, including the rule that a side left
/// without a legal move loses
pub fn game_result(board: &Board, last_mover: Player) -> GameResult {
    if let Some(player) = winner(board, last_mover) {
        return GameResult::win_for(player);
    }
    if !has_legal_move(board, last_mover.opponent()) {
        return GameResult::win_for(last_mover);
    }
    GameResult::Ongoing
}
