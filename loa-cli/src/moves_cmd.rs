//! Moves command - list legal moves for a position

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use loa_core::{legal_moves, Board, Move, Player};

#[derive(Args)]
pub struct MovesArgs {
    /// Board text file (8 lines of `.`, `b`, `w`); defaults to the starting position
    #[arg(long, value_name = "FILE")]
    pub board: Option<PathBuf>,

    /// Side to list moves for
    #[arg(long, default_value = "black")]
    pub player: Player,
}

/// Run moves command
pub fn run(args: MovesArgs) -> Result<()> {
    let board = load_board(args.board.as_ref())?;
    let moves = legal_moves(&board, args.player);

    println!("{}", board);
    println!("{} legal moves for {}:", moves.len(), args.player);
    for line in group_by_origin(&moves) {
        println!("  {}", line);
    }
    Ok(())
}

fn load_board(path: Option<&PathBuf>) -> Result<Board> {
    let Some(path) = path else {
        return Ok(Board::initial());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Board::parse(&text).with_context(|| format!("Invalid board in {}", path.display()))
}

/// One line per origin square, e.g. `b8: b8-b6 b8-d6 b8-h8`
fn group_by_origin(moves: &[Move]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = None;
    for mv in moves {
        if current != Some(mv.from) {
            current = Some(mv.from);
            lines.push(format!("{}:", mv.from));
        }
        if let Some(line) = lines.last_mut() {
            line.push(' ');
            line.push_str(&mv.notation());
        }
    }
    lines
}
