//! Per-move quality analysis of chess games driven by a UCI engine.
//!
//! A game's main line is replayed from the starting position. For every ply
//! the engine searches the position before the move; if the played move is
//! not its choice, a second search restricted to the played move scores it.
//! The change in the mover's win/draw/loss probabilities is then turned into
//! a quality label.
//!
//! # Overview
//!
//! - [`EngineSession`] - Handshake and request/response over a UCI engine process
//! - [`MoveEvaluator`] - Best-move and played-move search for one ply
//! - [`GameReplay`] - Replays the game and builds [`MoveRecord`]s
//! - [`ClassificationPolicy`] - Maps a record to a [`MoveQuality`]; [`ThresholdPolicy`] by default
//! - [`analyze_game_streaming`] - Runs a whole game on a background task
//!
//! # Example
//!
//! ```ignore
//! use game_analysis::{analyze_game_streaming, AnalysisRequest, EngineConfig};
//!
//! let request = AnalysisRequest::new("1. e4 e5 2. Nf3 Nc6").with_depth(12);
//! let mut stream = analyze_game_streaming(request, EngineConfig::default());
//! while let Some(record) = stream.records.recv().await {
//!     println!("{} {}{}", record.move_number, record.move_text, record.classification_symbol);
//! }
//! stream.outcome.await??;
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod evaluator;
pub mod pgn;
pub mod pipeline;
pub mod quality;
pub mod reader;
pub mod replay;
pub mod session;

pub use config::EngineConfig;
pub use error::{AnalysisError, EngineError};
pub use evaluation::{Assessment, EvaluationResult, Side, Wdl};
pub use evaluator::{MoveEvaluator, SearchReport};
pub use pipeline::{
    analyze_game, analyze_game_streaming, AnalysisRequest, AnalysisStream, EngineLauncher,
    GameAnalysis, DEFAULT_DEPTH,
};
pub use quality::{ClassificationPolicy, GameSummary, MoveQuality, PlayerStats, ThresholdPolicy};
pub use replay::{GameReplay, MoveRecord};
pub use session::EngineSession;
