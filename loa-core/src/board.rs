//! Board geometry, the 8x8 grid and its positional hash

use crate::pieces::{Piece, Player};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Board side length
pub const BOARD_SIZE: usize = 8;

/// Number of cells on the board
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Pieces per side in the starting position
pub const PIECES_PER_SIDE: u8 = 12;

/// Column letters for algebraic notation
const COLUMNS: [char; BOARD_SIZE] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// Direction vectors (d_row, d_col)
/// Index: 0=N, 1=S, 2=W, 3=E, 4=NW, 5=NE, 6=SW, 7=SE
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),  // N
    (1, 0),   // S
    (0, -1),  // W
    (0, 1),   // E
    (-1, -1), // NW
    (-1, 1),  // NE
    (1, -1),  // SW
    (1, 1),   // SE
];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have 8 rows, got {0}")]
    RowCount(usize),

    #[error("row {row} must have 8 cells, got {len}")]
    ColumnCount { row: usize, len: usize },

    #[error("invalid cell {found:?} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, found: char },

    #[error("invalid square: {0}")]
    InvalidSquare(String),
}

// ============================================================================
// POSITION
// ============================================================================

/// Board coordinates: row 0 is the top rank (8), column 0 is file a
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Check if this position is on the board
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    pub fn index(&self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::new((index / BOARD_SIZE) as u8, (index % BOARD_SIZE) as u8)
    }

    /// Step `steps` times along `dir`, `None` when leaving the board
    pub fn offset(&self, dir: (i8, i8), steps: i8) -> Option<Position> {
        let row = self.row as i8 + dir.0 * steps;
        let col = self.col as i8 + dir.1 * steps;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Position::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// The up to eight king-move neighbours
    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        DIRECTIONS.iter().filter_map(move |&dir| self.offset(dir, 1))
    }

    /// Doubled Manhattan distance to the board centre (3.5, 3.5)
    pub fn center_distance2(&self) -> u8 {
        let dr = (2 * self.row as i8 - 7).unsigned_abs();
        let dc = (2 * self.col as i8 - 7).unsigned_abs();
        dr + dc
    }

    /// Algebraic notation, e.g. (0,0) is `a8`
    pub fn notation(&self) -> String {
        format!("{}{}", COLUMNS[self.col as usize], BOARD_SIZE - self.row as usize)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

impl FromStr for Position {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file.to_ascii_lowercase(), rank),
            _ => return Err(BoardError::InvalidSquare(s.to_string())),
        };
        let col = COLUMNS
            .iter()
            .position(|&c| c == file)
            .ok_or_else(|| BoardError::InvalidSquare(s.to_string()))?;
        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=BOARD_SIZE as u32).contains(r))
            .ok_or_else(|| BoardError::InvalidSquare(s.to_string()))?;
        Ok(Position::new((BOARD_SIZE as u32 - rank) as u8, col as u8))
    }
}

// ============================================================================
// ZOBRIST KEYS
// ============================================================================

struct ZobristKeys {
    cells: [[u64; 2]; CELL_COUNT],
    white_to_move: u64,
}

fn zobrist() -> &'static ZobristKeys {
    static KEYS: OnceLock<ZobristKeys> = OnceLock::new();
    KEYS.get_or_init(|| {
        // Fixed seed so hashes are identical across runs
        let mut rng = ChaCha8Rng::seed_from_u64(0x4c4f_415a_0b51);
        let mut cells = [[0u64; 2]; CELL_COUNT];
        for cell in cells.iter_mut() {
            cell[0] = rng.gen();
            cell[1] = rng.gen();
        }
        ZobristKeys {
            cells,
            white_to_move: rng.gen(),
        }
    })
}

fn piece_key(index: usize, piece: Piece) -> u64 {
    match piece.owner() {
        Some(player) => zobrist().cells[index][player.index()],
        None => 0,
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Fixed 8x8 grid, row-major. Cheap to copy.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Piece>>", into = "Vec<Vec<Piece>>")]
pub struct Board {
    cells: [Piece; CELL_COUNT],
    counts: [u8; 2],
    hash: u64,
}

impl Board {
    /// Board with no pieces
    pub fn empty() -> Self {
        Self {
            cells: [Piece::Empty; CELL_COUNT],
            counts: [0; 2],
            hash: 0,
        }
    }

    /// Standard starting position
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for i in 1..BOARD_SIZE as u8 - 1 {
            board.set(Position::new(0, i), Piece::Black);
            board.set(Position::new(7, i), Piece::Black);
            board.set(Position::new(i, 0), Piece::White);
            board.set(Position::new(i, 7), Piece::White);
        }
        board
    }

    /// Parse the text format: 8 lines of `.`, `b`, `w`; whitespace between cells is ignored
    pub fn parse(text: &str) -> Result<Self, BoardError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(BoardError::RowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != BOARD_SIZE {
                return Err(BoardError::ColumnCount { row, len: cells.len() });
            }
            for (col, &c) in cells.iter().enumerate() {
                let piece = Piece::from_symbol(c).ok_or(BoardError::InvalidCell { row, col, found: c })?;
                board.set(Position::new(row as u8, col as u8), piece);
            }
        }
        Ok(board)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Piece at a position. The position must be on the board.
    pub fn get(&self, pos: Position) -> Piece {
        self.cells[pos.index()]
    }

    /// Number of pieces owned by `player`
    pub fn count(&self, player: Player) -> u8 {
        self.counts[player.index()]
    }

    /// Positions of all of `player`'s pieces, row-major
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = Position> + '_ {
        let target = Piece::from(player);
        self.cells
            .iter()
            .enumerate()
            .filter(move |&(_, &p)| p == target)
            .map(|(i, _)| Position::from_index(i))
    }

    /// Position hash for the transposition table; side to move is mixed in
    pub fn hash_for(&self, to_move: Player) -> u64 {
        match to_move {
            Player::Black => self.hash,
            Player::White => self.hash ^ zobrist().white_to_move,
        }
    }

    /// Rows as nested vectors (serialisation form)
    pub fn to_rows(&self) -> Vec<Vec<Piece>> {
        self.cells.chunks(BOARD_SIZE).map(<[Piece]>::to_vec).collect()
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Set a cell, keeping piece counts and hash in sync
    pub fn set(&mut self, pos: Position, piece: Piece) {
        let index = pos.index();
        let old = self.cells[index];
        if let Some(owner) = old.owner() {
            self.counts[owner.index()] -= 1;
        }
        if let Some(owner) = piece.owner() {
            self.counts[owner.index()] += 1;
        }
        self.hash ^= piece_key(index, old) ^ piece_key(index, piece);
        self.cells[index] = piece;
    }

    /// Move the piece on `from` to `to`, returning what `to` held before.
    /// Performs no legality check.
    pub fn apply(&mut self, from: Position, to: Position) -> Piece {
        let moving = self.get(from);
        let previous = self.get(to);
        self.set(to, moving);
        self.set(from, Piece::Empty);
        previous
    }

    /// Inverse of [`Board::apply`]
    pub fn undo(&mut self, from: Position, to: Position, previous: Piece) {
        let moving = self.get(to);
        self.set(from, moving);
        self.set(to, previous);
    }

    /// Copy of this board with a move applied
    pub fn with_move(&self, from: Position, to: Position) -> Board {
        let mut next = *self;
        next.apply(from, to);
        next
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl TryFrom<Vec<Vec<Piece>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<Piece>>) -> Result<Self, Self::Error> {
        if rows.len() != BOARD_SIZE {
            return Err(BoardError::RowCount(rows.len()));
        }
        let mut board = Board::empty();
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != BOARD_SIZE {
                return Err(BoardError::ColumnCount { row, len: cells.len() });
            }
            for (col, &piece) in cells.iter().enumerate() {
                board.set(Position::new(row as u8, col as u8), piece);
            }
        }
        Ok(board)
    }
}

impl From<Board> for Vec<Vec<Piece>> {
    fn from(board: Board) -> Self {
        board.to_rows()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(BOARD_SIZE) {
            let line: String = row.iter().map(|p| p.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}
