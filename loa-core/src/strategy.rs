//! Move-selection strategies by difficulty

use crate::ai::{AlphaBetaAI, SearchConfig, SearchResult};
use crate::board::Board;
use crate::config::BotConfig;
use crate::eval::Heuristics;
use crate::movegen::Move;
use crate::pieces::Piece;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bot strength tiers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    #[default]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy Bot",
            Difficulty::Medium => "Medium Bot",
            Difficulty::Hard => "Hard Bot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "Plays random legal moves",
            Difficulty::Medium => "Greedy heuristic with some variety",
            Difficulty::Hard => "Deep alpha-beta search",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}' (expected easy, medium or hard)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("no legal moves to choose from")]
    NoLegalMoves,
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// How many of the best greedy moves are candidates for the final pick
pub const GREEDY_TOP_K: usize = 3;

pub enum Strategy {
    Random,
    Greedy { top_k: usize },
    Search(Box<AlphaBetaAI>),
}

impl Strategy {
    pub fn for_difficulty(difficulty: Difficulty, search: SearchConfig, heuristics: Heuristics) -> Self {
        match difficulty {
            Difficulty::Easy => Strategy::Random,
            Difficulty::Medium => Strategy::Greedy { top_k: GREEDY_TOP_K },
            Difficulty::Hard => Strategy::Search(Box::new(AlphaBetaAI::new(search, heuristics))),
        }
    }
}

/// Cheap one-ply score for a candidate move: capture bonus, friendly
/// neighbours at the destination, isolation penalty, centralization.
pub fn greedy_score(board: &Board, mv: &Move) -> i32 {
    let after = board.with_move(mv.from, mv.to);
    let own = Piece::from(mv.mover);
    let friends = mv.to.neighbors().filter(|&n| after.get(n) == own).count() as i32;

    let mut score = 0;
    if mv.captured {
        score += 15;
    }
    score += friends * 5;
    if friends == 0 {
        score -= 10;
    }
    score - mv.to.center_distance2() as i32 / 2
}

/// A move-selecting bot
pub struct Bot {
    difficulty: Difficulty,
    strategy: Strategy,
    rng: ChaCha8Rng,
    last_search: Option<SearchResult>,
}

impl Bot {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::from_config(&BotConfig::new(difficulty))
    }

    pub fn from_config(config: &BotConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            difficulty: config.difficulty,
            strategy: Strategy::for_difficulty(config.difficulty, config.search.clone(), config.heuristics.clone()),
            rng,
            last_search: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn name(&self) -> &'static str {
        self.difficulty.label()
    }

    /// Statistics from the most recent full search, if this bot searches
    pub fn last_search(&self) -> Option<&SearchResult> {
        self.last_search.as_ref()
    }

    /// Pick one of `moves` for the position on `board`. The board is not modified.
    pub fn select_move(&mut self, board: &Board, moves: &[Move]) -> Result<Move, StrategyError> {
        if moves.is_empty() {
            return Err(StrategyError::NoLegalMoves);
        }
        match &mut self.strategy {
            Strategy::Random => moves.choose(&mut self.rng).copied().ok_or(StrategyError::NoLegalMoves),
            Strategy::Greedy { top_k } => {
                let mut scored: Vec<(i32, Move)> = moves.iter().map(|m| (greedy_score(board, m), *m)).collect();
                scored.sort_by(|a, b| b.0.cmp(&a.0));
                scored.truncate((*top_k).max(1));
                scored
                    .choose(&mut self.rng)
                    .map(|&(_, m)| m)
                    .ok_or(StrategyError::NoLegalMoves)
            }
            Strategy::Search(ai) => {
                let result = ai.select_move(board, moves)?;
                let chosen = result.best_move;
                self.last_search = Some(result);
                Ok(chosen)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use crate::movegen::legal_moves;
    use crate::pieces::Player;

    fn seeded(difficulty: Difficulty, seed: u64) -> Bot {
        Bot::from_config(&BotConfig::new(difficulty).with_seed(seed))
    }

    #[test]
    fn test_difficulty_parse_and_display() {
        for d in Difficulty::ALL {
            assert_eq!(d.to_string().parse::<Difficulty>(), Ok(d));
        }
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("impossible".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.label(), "Medium Bot");
    }

    #[test]
    fn test_every_strategy_rejects_empty_moves() {
        for d in Difficulty::ALL {
            let mut bot = seeded(d, 1);
            assert_eq!(bot.select_move(&Board::initial(), &[]), Err(StrategyError::NoLegalMoves));
        }
    }

    #[test]
    fn test_choices_are_legal_and_board_untouched() {
        let board = Board::initial();
        let moves = legal_moves(&board, Player::Black);
        for d in [Difficulty::Easy, Difficulty::Medium] {
            let mut bot = seeded(d, 7);
            for _ in 0..20 {
                let mv = bot.select_move(&board, &moves).unwrap();
                assert!(moves.contains(&mv));
            }
        }
        assert_eq!(board, Board::initial());
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let board = Board::initial();
        let moves = legal_moves(&board, Player::White);
        let picks = |seed| {
            let mut bot = seeded(Difficulty::Easy, seed);
            (0..10).map(|_| bot.select_move(&board, &moves).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }

    #[test]
    fn test_greedy_picks_from_top_three() {
        let board = Board::initial();
        let moves = legal_moves(&board, Player::Black);
        let mut scores: Vec<i32> = moves.iter().map(|m| greedy_score(&board, m)).collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        let third = scores[GREEDY_TOP_K - 1];

        let mut bot = seeded(Difficulty::Medium, 3);
        for _ in 0..30 {
            let mv = bot.select_move(&board, &moves).unwrap();
            assert!(greedy_score(&board, &mv) >= third);
        }
    }

    #[test]
    fn test_greedy_score_terms() {
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
        let capture = moves.iter().find(|m| m.captured).unwrap();
        // Capture bonus, isolated after the move, f5 is doubled distance 4 from centre
        assert_eq!(greedy_score(&board, capture), 15 - 10 - 2);

        let quiet = moves.iter().find(|m| m.to == Position::new(4, 4)).unwrap();
        assert_eq!(greedy_score(&board, quiet), -10 - 1);
    }

    #[test]
    fn test_hard_bot_records_search() {
        let board = Board::initial();
        let moves = legal_moves(&board, Player::Black);
        let config = BotConfig::new(Difficulty::Hard)
            .with_seed(1)
            .with_search(SearchConfig::default().with_max_depth(1));
        let mut bot = Bot::from_config(&config);
        let mv = bot.select_move(&board, &moves).unwrap();
        assert!(moves.contains(&mv));
        assert_eq!(bot.last_search().map(|r| r.depth), Some(1));
    }
}
