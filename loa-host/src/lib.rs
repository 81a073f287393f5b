//! LOA Host - runs bot searches off the caller's runtime
//!
//! This crate provides the execution boundary for bots:
//! - A dedicated worker thread per host, engines cached per difficulty
//! - An outer timeout on every request, with a random legal fallback move
//! - Replacement of a worker that is still busy with an abandoned search
//! - Explicit errors when the worker faults or disappears

mod worker;

use loa_core::{Board, Bot, BotConfig, Difficulty, Move};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot::{self, error::TryRecvError};

use worker::{SearchRequest, Worker, WorkerReply};
pub use worker::{Engine, EngineFactory};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Host configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// How long the caller waits for the worker before falling back
    pub outer_timeout_ms: u64,
    /// Minimum slack between the engine's own budget and the outer timeout
    pub margin_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            outer_timeout_ms: 10_000,
            margin_ms: 1_000,
        }
    }
}

impl HostConfig {
    pub fn outer_timeout(&self) -> Duration {
        Duration::from_millis(self.outer_timeout_ms)
    }

    pub fn margin(&self) -> Duration {
        Duration::from_millis(self.margin_ms)
    }

    pub fn with_outer_timeout(mut self, timeout: Duration) -> Self {
        self.outer_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin_ms = margin.as_millis() as u64;
        self
    }

    /// The outer timeout must exceed the engine's budget plus the margin
    pub fn validate(&self, inner_budget: Duration) -> Result<(), HostError> {
        if self.outer_timeout() <= inner_budget + self.margin() {
            return Err(HostError::InvalidTimeout {
                outer: self.outer_timeout(),
                inner: inner_budget,
                margin: self.margin(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// ERRORS AND RESULTS
// ============================================================================

#[derive(Debug, Error)]
pub enum HostError {
    #[error("outer timeout {outer:?} must exceed the search budget {inner:?} plus margin {margin:?}")]
    InvalidTimeout {
        outer: Duration,
        inner: Duration,
        margin: Duration,
    },
    #[error("no legal moves to choose from")]
    NoLegalMoves,
    #[error("search worker failed: {0}")]
    WorkerFault(String),
    #[error("search worker is gone")]
    WorkerGone,
    #[error("failed to start search worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// How the host came by its move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The engine answered in time
    Searched(Move),
    /// The outer timeout expired; a uniformly random legal move was picked
    Fallback(Move),
}

impl Decision {
    pub fn mv(&self) -> Move {
        match *self {
            Decision::Searched(mv) | Decision::Fallback(mv) => mv,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decision::Fallback(_))
    }
}

// ============================================================================
// SEARCH HOST
// ============================================================================

/// Runs move selection on a worker thread, one request at a time
pub struct SearchHost {
    config: HostConfig,
    factory: EngineFactory,
    worker: Worker,
    workers_started: u64,
    /// Reply channel of a request that outlived the outer timeout
    stalled: Option<oneshot::Receiver<WorkerReply>>,
    rng: ChaCha8Rng,
}

impl SearchHost {
    /// Host for the standard bots built from `bots` (difficulty set per request)
    pub fn new(config: HostConfig, bots: BotConfig) -> Result<Self, HostError> {
        config.validate(bots.search.time_budget())?;
        let seed = bots.seed;
        let factory: EngineFactory = Arc::new(move |difficulty| {
            let bot = Bot::from_config(&BotConfig {
                difficulty,
                ..bots.clone()
            });
            Box::new(bot) as Box<dyn Engine>
        });
        Self::with_factory(config, factory, seed)
    }

    /// Host for custom engines. Only checks the outer timeout against the margin.
    pub fn with_factory(config: HostConfig, factory: EngineFactory, seed: Option<u64>) -> Result<Self, HostError> {
        config.validate(Duration::ZERO)?;
        let worker = Worker::spawn(0, Arc::clone(&factory))?;
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            config,
            factory,
            worker,
            workers_started: 1,
            stalled: None,
            rng,
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Id of the current worker; increases each time a worker is replaced
    pub fn worker_id(&self) -> u64 {
        self.worker.id()
    }

    /// Whether the last request timed out and its search has not been collected
    pub fn has_stalled_search(&self) -> bool {
        self.stalled.is_some()
    }

    /// Choose a move for the position. `board` is copied; the caller's value is never touched.
    pub async fn best_move(&mut self, board: &Board, moves: &[Move], difficulty: Difficulty) -> Result<Decision, HostError> {
        if moves.is_empty() {
            return Err(HostError::NoLegalMoves);
        }
        self.collect_stalled()?;

        let (reply, mut response) = oneshot::channel();
        let request = SearchRequest {
            board: *board,
            moves: moves.to_vec(),
            difficulty,
            reply,
        };
        if let Err(request) = self.worker.submit(request) {
            tracing::warn!(worker = self.worker.id(), "search worker gone, starting a new one");
            self.replace_worker()?;
            self.worker.submit(request).map_err(|_| HostError::WorkerGone)?;
        }

        match tokio::time::timeout(self.config.outer_timeout(), &mut response).await {
            Ok(Ok(Ok(mv))) => Ok(Decision::Searched(mv)),
            Ok(Ok(Err(message))) => {
                tracing::error!(worker = self.worker.id(), %difficulty, error = %message, "search failed");
                Err(HostError::WorkerFault(message))
            }
            Ok(Err(_)) => {
                tracing::error!(worker = self.worker.id(), %difficulty, "search worker dropped the request");
                Err(HostError::WorkerGone)
            }
            Err(_) => {
                tracing::warn!(
                    worker = self.worker.id(),
                    %difficulty,
                    timeout_ms = self.config.outer_timeout_ms,
                    "search timed out, playing a random move"
                );
                self.stalled = Some(response);
                let fallback = moves.choose(&mut self.rng).copied().ok_or(HostError::NoLegalMoves)?;
                Ok(Decision::Fallback(fallback))
            }
        }
    }

    /// Deal with a search abandoned by the previous request: a late answer is
    /// discarded, a worker still busy with it is replaced.
    fn collect_stalled(&mut self) -> Result<(), HostError> {
        let Some(mut pending) = self.stalled.take() else {
            return Ok(());
        };
        match pending.try_recv() {
            Ok(_) => {
                tracing::debug!(worker = self.worker.id(), "discarding late answer from timed-out search");
                Ok(())
            }
            Err(TryRecvError::Empty) => {
                tracing::warn!(worker = self.worker.id(), "search worker still busy, replacing it");
                self.replace_worker()
            }
            Err(TryRecvError::Closed) => {
                tracing::warn!(worker = self.worker.id(), "search worker vanished, replacing it");
                self.replace_worker()
            }
        }
    }

    fn replace_worker(&mut self) -> Result<(), HostError> {
        let id = self.workers_started;
        self.worker = Worker::spawn(id, Arc::clone(&self.factory))?;
        self.workers_started += 1;
        Ok(())
    }
}
