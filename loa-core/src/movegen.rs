//! Moves and legal move generation
//!
//! A piece moves in a straight line (orthogonal or diagonal) exactly as many
//! squares as there are pieces, of either color, on the whole line it travels
//! along, itself included. It may jump its own pieces but not the opponent's,
//! and it may land on an empty square or capture an opponent piece.

use crate::board::{Board, Position, DIRECTIONS};
use crate::pieces::{Piece, Player};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A move made (or proposed) by one player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub mover: Player,
    pub from: Position,
    pub to: Position,
    /// Destination held an opponent piece when the move was generated
    pub captured: bool,
    pub timestamp: DateTime<Utc>,
}

impl Move {
    /// Same origin and destination, ignoring metadata
    pub fn same_squares(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to
    }

    /// Notation such as `b8-b6`, or `b8xa7` for a capture
    pub fn notation(&self) -> String {
        let sep = if self.captured { 'x' } else { '-' };
        format!("{}{}{}", self.from, sep, self.to)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

// ============================================================================
// LINE COUNTING
// ============================================================================

/// Pieces on the full line through `from` along `dir`, counting `from` itself
pub fn line_count(board: &Board, from: Position, dir: (i8, i8)) -> u8 {
    let mut count = 1;
    for sign in [1i8, -1] {
        let step = (dir.0 * sign, dir.1 * sign);
        let mut k = 1;
        while let Some(pos) = from.offset(step, k) {
            if !board.get(pos).is_empty() {
                count += 1;
            }
            k += 1;
        }
    }
    count
}

/// Destination of the single candidate move along `dir`, if legal
fn target(board: &Board, player: Player, from: Position, dir: (i8, i8)) -> Option<Position> {
    let distance = line_count(board, from, dir) as i8;
    let to = from.offset(dir, distance)?;

    let opponent = Piece::from(player.opponent());
    let blocked = (1..distance).any(|k| {
        from.offset(dir, k)
            .map_or(true, |pos| board.get(pos) == opponent)
    });
    if blocked {
        return None;
    }

    match board.get(to).owner() {
        Some(owner) if owner == player => None,
        _ => Some(to),
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Legal destinations for the piece on `from`.
///
/// Empty when `from` does not hold one of `player`'s pieces.
pub fn destinations(board: &Board, player: Player, from: Position) -> Vec<Position> {
    if !from.is_valid() || board.get(from) != Piece::from(player) {
        return Vec::new();
    }
    DIRECTIONS
        .iter()
        .filter_map(|&dir| target(board, player, from, dir))
        .collect()
}

/// All legal moves for `player`, stamped with the current time
pub fn legal_moves(board: &Board, player: Player) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    generate_moves(board, player, Utc::now(), &mut moves);
    moves
}

/// Append every legal move for `player` to `out`, stamped with `timestamp`
pub fn generate_moves(board: &Board, player: Player, timestamp: DateTime<Utc>, out: &mut Vec<Move>) {
    for from in board.pieces(player) {
        for &dir in DIRECTIONS.iter() {
            if let Some(to) = target(board, player, from, dir) {
                out.push(Move {
                    mover: player,
                    from,
                    to,
                    captured: !board.get(to).is_empty(),
                    timestamp,
                });
            }
        }
    }
}

/// Whether `player` has at least one legal move
pub fn has_legal_move(board: &Board, player: Player) -> bool {
    board.pieces(player).any(|from| {
        DIRECTIONS
            .iter()
            .any(|&dir| target(board, player, from, dir).is_some())
    })
}

/// Whether moving `from` -> `to` is legal for `player`
pub fn is_legal(board: &Board, player: Player, from: Position, to: Position) -> bool {
    destinations(board, player, from).contains(&to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn sorted(mut v: Vec<Position>) -> Vec<Position> {
        v.sort();
        v
    }

    /// Brute-force count of every occupied square on the line through `from`
    fn full_line(board: &Board, from: Position, dir: (i8, i8)) -> u8 {
        (0..64)
            .map(Position::from_index)
            .filter(|p| !board.get(*p).is_empty())
            .filter(|p| {
                let dr = p.row as i8 - from.row as i8;
                let dc = p.col as i8 - from.col as i8;
                // Collinear with `dir` through `from`
                dr * dir.1 == dc * dir.0
            })
            .count() as u8
    }

    #[test]
    fn test_line_count_matches_full_line() {
        let board = Board::parse(
            "
            .bbbbbb.
            w..b...w
            w.w..b.w
            w...w..w
            wb.....w
            w...b..w
            w......w
            .bb.bbb.
            ",
        )
        .unwrap();
        for from in Player::ALL.iter().flat_map(|&p| board.pieces(p)) {
            for &dir in DIRECTIONS.iter() {
                assert_eq!(
                    line_count(&board, from, dir),
                    full_line(&board, from, dir),
                    "from {from} dir {dir:?}"
                );
            }
        }
    }

    #[test]
    fn test_black_b8_initial_destinations() {
        // b8 with the a-file full of white pieces:
        // S: b-file holds 2 pieces -> b6. E: rank 8 holds 6 -> h8, jumping friends.
        // SE: diagonal b8..h2 holds 2 -> d6. Every other direction leaves the board.
        let board = Board::initial();
        let dests = sorted(destinations(&board, Player::Black, pos(0, 1)));
        assert_eq!(dests, sorted(vec![pos(2, 1), pos(2, 3), pos(0, 7)]));
    }

    #[test]
    fn test_initial_move_count() {
        let board = Board::initial();
        assert_eq!(legal_moves(&board, Player::Black).len(), 36);
        assert_eq!(legal_moves(&board, Player::White).len(), 36);
    }

    #[test]
    fn test_never_lands_on_friend_or_jumps_enemy() {
        let board = Board::parse(
            "
            ..b.....
            ..w.....
            ..b.....
            ........
            ..bw....
            ........
            .w..b...
            ........
            ",
        )
        .unwrap();
        for player in Player::ALL {
            for mv in legal_moves(&board, player) {
                assert_ne!(board.get(mv.to), Piece::from(player));
                let dir = (
                    (mv.to.row as i8 - mv.from.row as i8).signum(),
                    (mv.to.col as i8 - mv.from.col as i8).signum(),
                );
                let mut p = mv.from.offset(dir, 1).unwrap();
                while p != mv.to {
                    assert_ne!(board.get(p), Piece::from(player.opponent()));
                    p = p.offset(dir, 1).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_enemy_blocks_friend_does_not() {
        let blocked = Board::parse(
            "
            b.......
            w.......
            ........
            ........
            ........
            ........
            ........
            ........
            ",
        )
        .unwrap();
        assert!(!is_legal(&blocked, Player::Black, pos(0, 0), pos(2, 0)));

        let jump = Board::parse(
            "
            b.......
            b.......
            ........
            ........
            ........
            ........
            ........
            ........
            ",
        )
        .unwrap();
        assert!(is_legal(&jump, Player::Black, pos(0, 0), pos(2, 0)));
    }

    #[test]
    fn test_capture_flag() {
        let board = Board::parse(
            "
            ........
            ........
            ........
            ...b.w..
            ........
            ........
            ........
            ........
            ",
        )
        .unwrap();
        let moves = legal_moves(&board, Player::Black);
        assert_eq!(moves.len(), 8);
        let captures: Vec<_> = moves.iter().filter(|m| m.captured).collect();
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].to, pos(3, 5));
        assert_eq!(captures[0].notation(), "d5xf5");
    }

    #[test]
    fn test_lone_piece_moves_one_square() {
        let board = Board::parse(
            "
            ........
            ........
            ........
            ...b....
            ........
            ........
            ........
            ........
            ",
        )
        .unwrap();
        let dests = destinations(&board, Player::Black, pos(3, 3));
        assert_eq!(dests.len(), 8);
        assert!(dests.iter().all(|d| d.neighbors().any(|n| n == pos(3, 3))));
    }

    #[test]
    fn test_boxed_in_piece_has_no_moves() {
        // Black in the corner: every direction is off board or lands on/over white
        let board = Board::parse(
            "
            bw......
            ww......
            ........
            ........
            ........
            ........
            ........
            ........
            ",
        )
        .unwrap();
        assert!(destinations(&board, Player::Black, pos(0, 0)).is_empty());
        assert!(!has_legal_move(&board, Player::Black));
    }

    #[test]
    fn test_wrong_owner_has_no_destinations() {
        let board = Board::initial();
        assert!(destinations(&board, Player::White, pos(0, 1)).is_empty());
        assert!(destinations(&board, Player::Black, pos(3, 3)).is_empty());
    }
}
