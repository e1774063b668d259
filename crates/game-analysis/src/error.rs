//! Error types for engine sessions and game analysis.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to a UCI engine process.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable could not be started.
    #[error("failed to spawn engine '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The engine never confirmed it was ready.
    #[error("engine handshake failed: {0}")]
    Handshake(String),
    /// Reading from or writing to the engine pipes failed.
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The engine output ended before the expected response.
    #[error("engine output closed before the response was complete")]
    StreamClosed,
    /// The engine did not answer within the deadline.
    #[error("engine did not respond within {0:?}")]
    Timeout(Duration),
    /// A request was issued before the handshake or after `close`.
    #[error("engine session is not ready")]
    NotReady,
}

/// Errors that end the analysis of a game.
///
/// Every variant is fatal for the current game: records emitted before the
/// error remain valid, nothing after it is produced.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No moves were supplied.
    #[error("no PGN provided")]
    EmptyInput,
    /// The engine could not be started or failed its handshake.
    #[error("engine startup failed: {0}")]
    EngineStartup(#[source] EngineError),
    /// A move in the game could not be applied to the running position.
    #[error("invalid move '{token}' at ply {ply}: {reason}")]
    Replay {
        ply: usize,
        token: String,
        reason: String,
    },
    /// A search ended without a `bestmove` line.
    #[error("analysis error at ply {ply}: {source}")]
    Analysis {
        ply: usize,
        #[source]
        source: EngineError,
    },
    /// Communication with the engine broke down.
    #[error("engine I/O failed: {0}")]
    EngineIo(#[source] EngineError),
    /// The analysis task stopped without reporting an outcome.
    #[error("analysis task ended unexpectedly")]
    Interrupted,
}

impl AnalysisError {
    /// Classify an engine failure that happened while searching `ply`.
    ///
    /// A closed stream means the engine died mid-search; everything else is a
    /// transport problem.
    pub(crate) fn during_search(ply: usize, err: EngineError) -> Self {
        match err {
            EngineError::StreamClosed => AnalysisError::Analysis { ply, source: err },
            other => AnalysisError::EngineIo(other),
        }
    }
}
