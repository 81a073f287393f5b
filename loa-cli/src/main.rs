//! LOA CLI - Command-line interface
//!
//! Commands:
//! - play: Play a bot-vs-bot game through the search host
//! - replay: Verify a saved move history
//! - moves: List legal moves for a position

mod moves_cmd;
mod play_cmd;
mod record;
mod replay_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loa")]
#[command(about = "Lines of Action engine and bots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game between two bots
    Play(play_cmd::PlayArgs),
    /// Replay a saved move history and print the final position
    Replay(replay_cmd::ReplayArgs),
    /// List legal moves for a position
    Moves(moves_cmd::MovesArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args),
        Commands::Replay(args) => replay_cmd::run(args),
        Commands::Moves(args) => moves_cmd::run(args),
    }
}
