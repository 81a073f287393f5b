//! LOA Core - Lines of Action rules and AI
//!
//! This crate provides the core game logic for Lines of Action:
//! - Board model (8x8 grid, pieces, positions, Zobrist hashing)
//! - Line-count move generation
//! - Connectivity and win detection
//! - Position evaluation
//! - Alpha-beta search with transposition table and quiescence
//! - Random, greedy and search bots selected by difficulty

pub mod pieces;
pub mod board;
pub mod movegen;
pub mod rules;
pub mod eval;
pub mod tt;
pub mod ai;
pub mod strategy;
pub mod config;
pub mod game;

// Re-exports for convenient access
pub use pieces::{Piece, Player};
pub use board::{Board, BoardError, Position, BOARD_SIZE, DIRECTIONS};
pub use movegen::{destinations, legal_moves, Move};
pub use rules::{game_result, is_connected, winner, GameResult};
pub use eval::{evaluate, evaluate_for, Heuristics, WIN_VALUE};
pub use ai::{AlphaBetaAI, SearchConfig, SearchResult};
pub use strategy::{Bot, Difficulty, StrategyError};
pub use config::BotConfig;
pub use game::{replay, Game, MoveError, ReplayError};
