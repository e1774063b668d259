//! Streaming analysis of a whole game.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{AnalysisError, EngineError};
use crate::evaluator::MoveEvaluator;
use crate::pgn::main_line;
use crate::quality::{ClassificationPolicy, GameSummary, ThresholdPolicy};
use crate::replay::{GameReplay, MoveRecord};
use crate::session::EngineSession;

/// Search depth used when a request asks for 0.
pub const DEFAULT_DEPTH: u32 = 2;

/// Records buffered between the analysis task and its consumer.
const RECORD_BUFFER: usize = 32;

/// A game to analyze and how.
#[derive(Clone)]
pub struct AnalysisRequest {
    /// PGN text; only the main line of the first game is analyzed.
    pub pgn: String,
    /// Search depth per position, 0 for [`DEFAULT_DEPTH`].
    pub depth: u32,
    pub policy: Arc<dyn ClassificationPolicy>,
}

impl AnalysisRequest {
    /// Request at the default depth with the default thresholds.
    pub fn new(pgn: impl Into<String>) -> Self {
        Self {
            pgn: pgn.into(),
            depth: DEFAULT_DEPTH,
            policy: Arc::new(ThresholdPolicy::default()),
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_policy(mut self, policy: impl ClassificationPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn effective_depth(&self) -> u32 {
        if self.depth == 0 {
            DEFAULT_DEPTH
        } else {
            self.depth
        }
    }
}

impl fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("pgn", &self.pgn)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// Starts a fresh engine session for each analysis.
pub trait EngineLauncher: Send + Sync + 'static {
    fn launch(&self) -> impl Future<Output = Result<EngineSession, EngineError>> + Send;
}

impl EngineLauncher for EngineConfig {
    fn launch(&self) -> impl Future<Output = Result<EngineSession, EngineError>> + Send {
        EngineSession::open(self)
    }
}

/// Completed analysis of a game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnalysis {
    pub moves: Vec<MoveRecord>,
    pub summary: GameSummary,
}

/// Output of [`analyze_game_streaming`].
///
/// `records` yields one record per ply in order and closes when the analysis
/// stops. `outcome` then resolves exactly once: `Ok(())` after the last ply,
/// or the error that ended the analysis.
pub struct AnalysisStream {
    pub records: mpsc::Receiver<MoveRecord>,
    pub outcome: oneshot::Receiver<Result<(), AnalysisError>>,
}

impl AnalysisStream {
    /// Wait for the whole game. Records produced before an error are dropped.
    pub async fn collect(mut self) -> Result<GameAnalysis, AnalysisError> {
        let mut moves = Vec::new();
        while let Some(record) = self.records.recv().await {
            moves.push(record);
        }
        self.outcome
            .await
            .unwrap_or_else(|_| Err(AnalysisError::Interrupted))?;

        let summary = GameSummary::from_records(&moves);
        Ok(GameAnalysis { moves, summary })
    }
}

/// Analyze a game on a background task, streaming records as they are ready.
///
/// The engine is launched only when the PGN contains moves and is closed on
/// every exit path. If `records` is dropped the analysis stops early and
/// reports `Ok(())`. Must be called from within a tokio runtime.
pub fn analyze_game_streaming<L>(request: AnalysisRequest, launcher: L) -> AnalysisStream
where
    L: EngineLauncher,
{
    let (record_tx, records) = mpsc::channel(RECORD_BUFFER);
    let (outcome_tx, outcome) = oneshot::channel();

    tokio::spawn(async move {
        let result = run(request, &launcher, record_tx).await;
        match &result {
            Ok(()) => info!("analysis complete"),
            Err(e) => warn!(error = %e, "analysis failed"),
        }
        let _ = outcome_tx.send(result);
    });

    AnalysisStream { records, outcome }
}

/// Analyze a game and wait for all records.
pub async fn analyze_game<L>(request: AnalysisRequest, launcher: L) -> Result<GameAnalysis, AnalysisError>
where
    L: EngineLauncher,
{
    analyze_game_streaming(request, launcher).collect().await
}

async fn run<L>(
    request: AnalysisRequest,
    launcher: &L,
    records: mpsc::Sender<MoveRecord>,
) -> Result<(), AnalysisError>
where
    L: EngineLauncher,
{
    let mut replay = GameReplay::new(main_line(&request.pgn), request.policy.clone());
    if replay.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let depth = request.effective_depth();
    info!(plies = replay.len(), depth, "starting analysis");

    let mut session = launcher.launch().await.map_err(AnalysisError::EngineStartup)?;

    let result = stream_records(&mut replay, &mut session, depth, &records).await;
    session.close().await;
    result
}

async fn stream_records(
    replay: &mut GameReplay,
    session: &mut EngineSession,
    depth: u32,
    records: &mpsc::Sender<MoveRecord>,
) -> Result<(), AnalysisError> {
    let mut evaluator = MoveEvaluator::new(session, depth);

    while let Some(next) = replay.next_record(&mut evaluator).await {
        let record = next?;
        if records.send(record).await.is_err() {
            info!(ply = replay.history().len(), "record consumer went away, stopping");
            break;
        }
    }

    Ok(())
}
