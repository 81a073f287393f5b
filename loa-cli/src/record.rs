//! Saved game files

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loa_core::{Difficulty, GameResult, Move};

/// A finished (or abandoned) game as written by `loa play --output`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    pub black: Difficulty,
    pub white: Difficulty,
    pub result: GameResult,
    pub saved_at: DateTime<Utc>,
    pub moves: Vec<Move>,
}

impl GameRecord {
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Load a move history: either a full game record or a bare JSON array of moves
pub fn load_moves(path: &Path) -> Result<Vec<Move>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_moves(&content).with_context(|| format!("Failed to parse move history: {}", path.display()))
}

fn parse_moves(content: &str) -> Result<Vec<Move>> {
    if let Ok(record) = serde_json::from_str::<GameRecord>(content) {
        return Ok(record.moves);
    }
    // Fall back to a bare list, reporting its error if that fails too
    let moves: Vec<Move> = serde_json::from_str(content)?;
    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loa_core::{legal_moves, Board, Player};

    fn sample_moves() -> Vec<Move> {
        legal_moves(&Board::initial(), Player::Black).into_iter().take(1).collect()
    }

    #[test]
    fn test_parse_full_record() {
        let record = GameRecord {
            black: Difficulty::Easy,
            white: Difficulty::Hard,
            result: GameResult::Ongoing,
            saved_at: Utc::now(),
            moves: sample_moves(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(parse_moves(&json).unwrap(), record.moves);
    }

    #[test]
    fn test_parse_bare_list() {
        let moves = sample_moves();
        let json = serde_json::to_string(&moves).unwrap();
        assert_eq!(parse_moves(&json).unwrap(), moves);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_moves("{\"moves\": 3}").is_err());
        assert!(parse_moves("not json").is_err());
    }
}
