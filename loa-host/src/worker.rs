//! Search worker thread
//!
//! A worker owns its engines (one per difficulty, created on first use) and
//! serves requests one at a time from an unbounded channel. Each request
//! carries a oneshot sender for its reply.

use loa_core::{Board, Bot, Difficulty, Move, StrategyError};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Anything that can pick a move on the worker thread
pub trait Engine: Send {
    fn select_move(&mut self, board: &Board, moves: &[Move]) -> Result<Move, StrategyError>;
}

impl Engine for Bot {
    fn select_move(&mut self, board: &Board, moves: &[Move]) -> Result<Move, StrategyError> {
        Bot::select_move(self, board, moves)
    }
}

/// Builds the engine a worker uses for a difficulty
pub type EngineFactory = Arc<dyn Fn(Difficulty) -> Box<dyn Engine> + Send + Sync>;

/// Chosen move, or a description of what went wrong
pub(crate) type WorkerReply = Result<Move, String>;

pub(crate) struct SearchRequest {
    pub board: Board,
    pub moves: Vec<Move>,
    pub difficulty: Difficulty,
    pub reply: oneshot::Sender<WorkerReply>,
}

/// Handle to a running worker thread. Dropping it lets the thread exit once
/// its current request (if any) is done.
pub(crate) struct Worker {
    id: u64,
    requests: mpsc::UnboundedSender<SearchRequest>,
}

impl Worker {
    pub fn spawn(id: u64, factory: EngineFactory) -> std::io::Result<Self> {
        let (requests, inbox) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name(format!("loa-search-{id}"))
            .spawn(move || serve(id, inbox, factory))?;
        tracing::debug!(worker = id, "search worker started");
        Ok(Self { id, requests })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Hand a request to the worker; gives it back if the thread is gone
    pub fn submit(&self, request: SearchRequest) -> Result<(), SearchRequest> {
        self.requests.send(request).map_err(|e| e.0)
    }
}

fn serve(id: u64, mut inbox: mpsc::UnboundedReceiver<SearchRequest>, factory: EngineFactory) {
    let mut engines: HashMap<Difficulty, Box<dyn Engine>> = HashMap::new();

    while let Some(request) = inbox.blocking_recv() {
        let SearchRequest {
            board,
            moves,
            difficulty,
            reply,
        } = request;

        let engine = engines.entry(difficulty).or_insert_with(|| factory(difficulty));
        let outcome = catch_unwind(AssertUnwindSafe(|| engine.select_move(&board, &moves)));
        let answer = match outcome {
            Ok(Ok(mv)) => Ok(mv),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => {
                // A panicked engine may hold half-updated state
                engines.remove(&difficulty);
                Err(panic_message(panic.as_ref()))
            }
        };

        if reply.send(answer).is_err() {
            tracing::debug!(worker = id, %difficulty, "caller stopped waiting; reply dropped");
        }
    }
    tracing::debug!(worker = id, "search worker exiting");
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    format!("engine panicked: {detail}")
}
