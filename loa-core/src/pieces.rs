//! Piece and player definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contents of a single board cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    #[default]
    Empty,
    Black,
    White,
}

impl Piece {
    /// Owner of the piece, `None` for an empty cell
    pub fn owner(self) -> Option<Player> {
        match self {
            Piece::Empty => None,
            Piece::Black => Some(Player::Black),
            Piece::White => Some(Player::White),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }

    /// Single-character cell symbol used by the board text format
    pub fn symbol(self) -> char {
        match self {
            Piece::Empty => '.',
            Piece::Black => 'b',
            Piece::White => 'w',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(Piece::Empty),
            'b' | 'B' => Some(Piece::Black),
            'w' | 'W' => Some(Piece::White),
            _ => None,
        }
    }
}

impl From<Player> for Piece {
    fn from(player: Player) -> Self {
        match player {
            Player::Black => Piece::Black,
            Player::White => Piece::White,
        }
    }
}

/// Player color. Black moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Black = 0,
    White = 1,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Black, Player::White];

    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// +1 for White, -1 for Black (evaluation sign convention)
    pub fn sign(self) -> i32 {
        match self {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "black"),
            Player::White => write!(f, "white"),
        }
    }
}

impl std::str::FromStr for Player {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" | "b" => Ok(Player::Black),
            "white" | "w" => Ok(Player::White),
            other => Err(format!("unknown player: {other}")),
        }
    }
}
