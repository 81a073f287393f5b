//! Position evaluation

use crate::board::{Board, Position};
use crate::pieces::Player;
use crate::rules::{adjacency_count, largest_group};
use serde::{Deserialize, Serialize};

/// Win value (effectively infinite)
pub const WIN_VALUE: i32 = 100_000;

/// Scores at or beyond this magnitude are forced wins or losses
pub const FORCED_WIN_THRESHOLD: i32 = WIN_VALUE - 1_000;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Value of each piece
    pub material: i32,
    /// Penalty per square of average distance to the side's centroid
    pub dispersion: i32,
    /// Bonus for each piece on the central 2x2 squares
    pub center_inner: i32,
    /// Bonus for each piece on the rest of the central 4x4
    pub center_core: i32,
    /// Bonus per same-color neighbour (counted from both pieces)
    pub adjacency: i32,
    /// Bonus per piece in the largest connected group
    pub largest_group: i32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            material: 15,
            dispersion: 3,
            center_inner: 4,
            center_core: 2,
            adjacency: 3,
            largest_group: 10,
        }
    }
}

/// Ten times the average Manhattan distance from each piece to the centroid
pub fn dispersion_tenths(board: &Board, player: Player) -> i32 {
    let pieces: Vec<Position> = board.pieces(player).collect();
    let n = pieces.len() as i32;
    if n == 0 {
        return 0;
    }
    let sum_row: i32 = pieces.iter().map(|p| p.row as i32).sum();
    let sum_col: i32 = pieces.iter().map(|p| p.col as i32).sum();
    // Distances are scaled by n so the centroid stays integral
    let total: i32 = pieces
        .iter()
        .map(|p| (p.row as i32 * n - sum_row).abs() + (p.col as i32 * n - sum_col).abs())
        .sum();
    total * 10 / (n * n)
}

fn center_bonus(pos: Position, heuristics: &Heuristics) -> i32 {
    match (pos.row, pos.col) {
        (3..=4, 3..=4) => heuristics.center_inner,
        (2..=5, 2..=5) => heuristics.center_core,
        _ => 0,
    }
}

/// One side's heuristic total
fn side_score(board: &Board, player: Player, heuristics: &Heuristics) -> i32 {
    let material = board.count(player) as i32 * heuristics.material;
    let center: i32 = board.pieces(player).map(|p| center_bonus(p, heuristics)).sum();
    let dispersion = heuristics.dispersion * dispersion_tenths(board, player) / 10;
    let adjacency = heuristics.adjacency * adjacency_count(board, player) as i32;
    let group = heuristics.largest_group * largest_group(board, player) as i32;
    material + center + adjacency + group - dispersion
}

/// Evaluate a position; positive favours White
pub fn evaluate(board: &Board, heuristics: &Heuristics) -> i32 {
    side_score(board, Player::White, heuristics) - side_score(board, Player::Black, heuristics)
}

/// Evaluate from `player`'s point of view
pub fn evaluate_for(board: &Board, player: Player, heuristics: &Heuristics) -> i32 {
    evaluate(board, heuristics) * player.sign()
}

/// Score of a decided position for the side to move, `ply` plies from the root.
/// Faster wins (and slower losses) score higher.
pub fn terminal_score(winner: Player, to_move: Player, ply: u32) -> i32 {
    let value = WIN_VALUE - ply as i32;
    if winner == to_move {
        value
    } else {
        -value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_symmetric() {
        let board = Board::initial();
        let h = Heuristics::default();
        assert_eq!(evaluate(&board, &h), 0);
        assert_eq!(evaluate_for(&board, Player::Black, &h), 0);
    }

    #[test]
    fn test_dispersion() {
        let board = Board::parse(
            "
            ........
            ........
            ........
            ...bb...
            ...bb...
            ........
            ........
            ........
            ",
        )
        .unwrap();
        // Every piece is (0.5, 0.5) from the centroid
        assert_eq!(dispersion_tenths(&board, Player::Black), 10);
        assert_eq!(dispersion_tenths(&board, Player::White), 0);
    }

    #[test]
    fn test_compact_center_beats_scattered_edge() {
        let board = Board::parse(
            "
            w......w
            ........
            ........
            ...bb...
            ...bb...
            ........
            ........
            w......w
            ",
        )
        .unwrap();
        let h = Heuristics::default();
        assert!(evaluate_for(&board, Player::Black, &h) > 0);
        assert_eq!(
            evaluate_for(&board, Player::White, &h),
            -evaluate_for(&board, Player::Black, &h)
        );
    }

    #[test]
    fn test_terminal_score_prefers_fast_wins() {
        assert!(terminal_score(Player::White, Player::White, 1) > terminal_score(Player::White, Player::White, 3));
        assert!(terminal_score(Player::Black, Player::White, 1) < terminal_score(Player::Black, Player::White, 3));
        assert!(terminal_score(Player::White, Player::White, 6) >= FORCED_WIN_THRESHOLD);
    }
}
