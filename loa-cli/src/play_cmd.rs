//! Play command - one game between two bots
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_bot_config(), play_game(), report_game()
//! - Level 3: next_move()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use loa_core::{BotConfig, Difficulty, Game, GameResult, Player};
use loa_host::{HostConfig, SearchHost};

use crate::record::GameRecord;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Black bot difficulty (easy, medium, hard); Black moves first
    #[arg(long, default_value = "medium")]
    pub black: Difficulty,

    /// White bot difficulty (easy, medium, hard)
    #[arg(long, default_value = "hard")]
    pub white: Difficulty,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many moves if nobody has won
    #[arg(long, default_value = "200")]
    pub max_moves: usize,

    /// Bot configuration JSON file (search limits, heuristic weights)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the game record as JSON
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// What happened in one game
#[derive(Debug)]
struct PlayedGame {
    game: Game,
    fallbacks: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Load the bot configuration
/// 2. Play the game through the search host
/// 3. Report and optionally save it
pub fn run(args: PlayArgs) -> Result<()> {
    let bots = load_bot_config(&args)?;

    tracing::info!(
        "Starting game: {} (black) vs {} (white), max {} moves",
        args.black.label(),
        args.white.label(),
        args.max_moves
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let played = runtime.block_on(play_game(&args, bots))?;

    report_game(&played, &args);

    if let Some(path) = &args.output {
        let record = GameRecord {
            black: args.black,
            white: args.white,
            result: played.game.result(),
            saved_at: Utc::now(),
            moves: played.game.history().to_vec(),
        };
        record.save(path)?;
        tracing::info!("Saved game record to {}", path.display());
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Bot configuration from file (or defaults), with the seed override applied
fn load_bot_config(args: &PlayArgs) -> Result<BotConfig> {
    let mut config = match &args.config {
        Some(path) => BotConfig::load(path)
            .with_context(|| format!("Failed to load bot config: {}", path.display()))?,
        None => BotConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

/// Play until someone wins or the move cap is reached
async fn play_game(args: &PlayArgs, bots: BotConfig) -> Result<PlayedGame> {
    let mut host = SearchHost::new(HostConfig::default(), bots).context("Failed to start search host")?;
    let mut game = Game::new();
    let mut fallbacks = 0;

    while !game.is_over() && game.history().len() < args.max_moves {
        let difficulty = side_difficulty(args, game.to_move());
        let (mv, fell_back) = next_move(&mut host, &game, difficulty).await?;
        if fell_back {
            fallbacks += 1;
        }
        game.play_move(mv).context("Search host returned an illegal move")?;
        tracing::debug!("{:>3}. {} {}", game.history().len(), mv.mover, mv);
    }

    Ok(PlayedGame { game, fallbacks })
}

/// Report the game
fn report_game(played: &PlayedGame, args: &PlayArgs) {
    if args.json {
        print_json_summary(played, args);
    } else {
        print_text_summary(played, args);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Ask the host for the side to move's choice
async fn next_move(host: &mut SearchHost, game: &Game, difficulty: Difficulty) -> Result<(loa_core::Move, bool)> {
    let moves = game.legal_moves();
    let decision = host
        .best_move(game.board(), &moves, difficulty)
        .await
        .with_context(|| format!("{} failed to choose a move", difficulty.label()))?;
    if decision.is_fallback() {
        tracing::warn!("{} ran out of time; played random move {}", difficulty.label(), decision.mv());
    }
    Ok((decision.mv(), decision.is_fallback()))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn side_difficulty(args: &PlayArgs, side: Player) -> Difficulty {
    match side {
        Player::Black => args.black,
        Player::White => args.white,
    }
}

fn result_text(result: GameResult) -> &'static str {
    match result {
        GameResult::Ongoing => "unfinished",
        GameResult::BlackWins => "black wins",
        GameResult::WhiteWins => "white wins",
    }
}

/// Notation as numbered pairs, e.g. `1. b8-b6 a7-c7`
fn format_pairs(notation: &[String]) -> Vec<String> {
    notation
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
        .collect()
}

/// Print summary as JSON
fn print_json_summary(played: &PlayedGame, args: &PlayArgs) {
    #[derive(serde::Serialize)]
    struct JsonOutput {
        black: Difficulty,
        white: Difficulty,
        result: GameResult,
        moves: usize,
        fallbacks: usize,
        notation: Vec<String>,
    }

    let output = JsonOutput {
        black: args.black,
        white: args.white,
        result: played.game.result(),
        moves: played.game.history().len(),
        fallbacks: played.fallbacks,
        notation: played.game.notation(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print summary as text
fn print_text_summary(played: &PlayedGame, args: &PlayArgs) {
    let game = &played.game;

    println!("\n=== {} vs {} ===", args.black.label(), args.white.label());
    for line in format_pairs(&game.notation()) {
        println!("  {}", line);
    }
    println!("\n{}", game.board());
    println!("Result:    {}", result_text(game.result()));
    println!("Moves:     {}", game.history().len());
    if played.fallbacks > 0 {
        println!("Fallbacks: {}", played.fallbacks);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(black: Difficulty, white: Difficulty, max_moves: usize) -> PlayArgs {
        PlayArgs {
            black,
            white,
            seed: Some(9),
            max_moves,
            config: None,
            output: None,
            json: false,
        }
    }

    #[test]
    fn test_format_pairs() {
        let notation = vec!["b8-b6".to_string(), "a7-c7".to_string(), "b6xc7".to_string()];
        assert_eq!(format_pairs(&notation), vec!["1. b8-b6 a7-c7", "2. b6xc7"]);
        assert!(format_pairs(&[]).is_empty());
    }

    #[test]
    fn test_side_difficulty() {
        let a = args(Difficulty::Easy, Difficulty::Hard, 10);
        assert_eq!(side_difficulty(&a, Player::Black), Difficulty::Easy);
        assert_eq!(side_difficulty(&a, Player::White), Difficulty::Hard);
    }

    #[test]
    fn test_seed_override() {
        let config = load_bot_config(&args(Difficulty::Easy, Difficulty::Easy, 1)).unwrap();
        assert_eq!(config.seed, Some(9));
    }

    #[tokio::test]
    async fn test_play_game_respects_move_cap() {
        let a = args(Difficulty::Easy, Difficulty::Medium, 6);
        let played = play_game(&a, load_bot_config(&a).unwrap()).await.unwrap();
        let len = played.game.history().len();
        assert!(len == 6 || played.game.is_over());
        assert_eq!(played.fallbacks, 0);
        assert_eq!(played.game.history()[0].mover, Player::Black);
    }
}
