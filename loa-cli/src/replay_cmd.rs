//! Replay command - verify a saved move history

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use loa_core::{game_result, replay, Board, GameResult, Move};

use crate::record::load_moves;

#[derive(Args)]
pub struct ReplayArgs {
    /// Game record or JSON array of moves
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the board after every move
    #[arg(long)]
    pub all: bool,
}

/// Run replay command
pub fn run(args: ReplayArgs) -> Result<()> {
    let moves = load_moves(&args.file)?;
    let boards = replay(&moves).with_context(|| format!("Invalid history in {}", args.file.display()))?;

    tracing::info!("Replayed {} moves from {}", moves.len(), args.file.display());

    if args.all {
        for (mv, board) in moves.iter().zip(boards.iter().skip(1)) {
            println!("{} {}\n{}", mv.mover, mv, board);
        }
    } else if let Some(board) = boards.last() {
        println!("{}", board);
    }

    println!("Moves:  {}", moves.len());
    println!("Result: {:?}", final_result(&moves, &boards));
    Ok(())
}

/// Result after the last replayed move
fn final_result(moves: &[Move], boards: &[Board]) -> GameResult {
    match (moves.last(), boards.last()) {
        (Some(mv), Some(board)) => game_result(board, mv.mover),
        _ => GameResult::Ongoing,
    }
}
