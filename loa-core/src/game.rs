//! Game session and replay

use crate::board::{Board, Position};
use crate::movegen::{destinations, legal_moves, Move};
use crate::pieces::{Piece, Player};
use crate::rules::{game_result, GameResult};
use chrono::Utc;
use thiserror::Error;

/// Why a move was refused. The board is untouched when any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,
    #[error("it is {expected}'s turn, not {found}'s")]
    NotYourTurn { expected: Player, found: Player },
    #[error("{square} does not hold a {player} piece")]
    NotYourPiece { square: Position, player: Player },
    #[error("{from}-{to} is not a legal move")]
    IllegalMove { from: Position, to: Position },
    #[error("capture flag on {from}-{to} does not match the board")]
    CaptureMismatch { from: Position, to: Position },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("move {index} ({notation}) cannot be replayed: {source}")]
pub struct ReplayError {
    pub index: usize,
    pub notation: String,
    #[source]
    pub source: MoveError,
}

// ============================================================================
// GAME
// ============================================================================

/// A game in progress: board, side to move, history and result
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    to_move: Player,
    history: Vec<Move>,
    result: GameResult,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position, Black to move
    pub fn new() -> Self {
        Self::from_board(Board::initial(), Player::Black)
    }

    /// Start from an arbitrary position with `to_move` to play
    pub fn from_board(board: Board, to_move: Player) -> Self {
        Self {
            board,
            to_move,
            history: Vec::new(),
            result: game_result(&board, to_move.opponent()),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result.is_over()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Legal moves for the side to move (none once the game is over)
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        legal_moves(&self.board, self.to_move)
    }

    /// Destinations for the piece on `from`, if it belongs to the side to move
    pub fn destinations(&self, from: Position) -> Vec<Position> {
        if self.is_over() {
            return Vec::new();
        }
        destinations(&self.board, self.to_move, from)
    }

    /// Move the side to move's piece from `from` to `to`
    pub fn play(&mut self, from: Position, to: Position) -> Result<Move, MoveError> {
        let mv = Move {
            mover: self.to_move,
            from,
            to,
            captured: to.is_valid() && !self.board.get(to).is_empty(),
            timestamp: Utc::now(),
        };
        self.play_move(mv)
    }

    /// Apply a move produced elsewhere (a bot, a saved history), keeping its timestamp
    pub fn play_move(&mut self, mv: Move) -> Result<Move, MoveError> {
        self.check(&mv)?;
        self.board.apply(mv.from, mv.to);
        self.history.push(mv);
        self.result = game_result(&self.board, mv.mover);
        self.to_move = mv.mover.opponent();
        tracing::trace!(mv = %mv, result = ?self.result, "move played");
        Ok(mv)
    }

    fn check(&self, mv: &Move) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if mv.mover != self.to_move {
            return Err(MoveError::NotYourTurn {
                expected: self.to_move,
                found: mv.mover,
            });
        }
        if !mv.from.is_valid() || self.board.get(mv.from) != Piece::from(mv.mover) {
            return Err(MoveError::NotYourPiece {
                square: mv.from,
                player: mv.mover,
            });
        }
        if !destinations(&self.board, mv.mover, mv.from).contains(&mv.to) {
            return Err(MoveError::IllegalMove { from: mv.from, to: mv.to });
        }
        if mv.captured == self.board.get(mv.to).is_empty() {
            return Err(MoveError::CaptureMismatch { from: mv.from, to: mv.to });
        }
        Ok(())
    }

    /// Move list in notation, e.g. `["b8-b6", "a7xb6"]`
    pub fn notation(&self) -> Vec<String> {
        self.history.iter().map(Move::notation).collect()
    }
}

// ============================================================================
// REPLAY
// ============================================================================

/// Re-apply a move history from the initial position.
///
/// Returns every board along the way, starting with the initial one.
pub fn replay(moves: &[Move]) -> Result<Vec<Board>, ReplayError> {
    let mut game = Game::new();
    let mut boards = Vec::with_capacity(moves.len() + 1);
    boards.push(*game.board());
    for (index, mv) in moves.iter().enumerate() {
        game.play_move(*mv).map_err(|source| ReplayError {
            index,
            notation: mv.notation(),
            source,
        })?;
        boards.push(*game.board());
    }
    Ok(boards)
}
