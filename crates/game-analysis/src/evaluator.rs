//! Two-search evaluation of a played move.

use tracing::debug;
use uci::{EngineInfo, EngineMessage, GoOptions, GuiCommand, Score};

use crate::error::{AnalysisError, EngineError};
use crate::evaluation::{score_to_pawns, Assessment, EvaluationResult, Wdl};
use crate::session::EngineSession;

/// What one `go` produced, read from the lines up to `bestmove`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    pub best_move: Option<String>,
    /// Last score reported before `bestmove`.
    pub score: Option<Score>,
    /// Last `wdl` triple reported before `bestmove`.
    pub wdl: Option<uci::Wdl>,
}

impl SearchReport {
    /// Scan the output of one search.
    ///
    /// Engines deepen iteratively, so later `info` lines supersede earlier
    /// ones.
    pub fn from_lines(lines: &[String]) -> Self {
        let mut report = SearchReport::default();
        for line in lines {
            match EngineMessage::parse(line) {
                Some(EngineMessage::Info(EngineInfo { score, wdl, .. })) => {
                    if score.is_some() {
                        report.score = score;
                    }
                    if wdl.is_some() {
                        report.wdl = wdl;
                    }
                }
                Some(EngineMessage::BestMove { mv, .. }) => {
                    report.best_move = Some(mv);
                    break;
                }
                _ => {}
            }
        }
        report
    }

    /// Score and probabilities for the side to move.
    ///
    /// A missing score counts as 0; missing `wdl` is estimated from the score.
    pub fn assessment(&self) -> Assessment {
        let score = self.score.map(score_to_pawns).unwrap_or(0.0);
        let wdl = match self.wdl {
            Some(wdl) => Wdl::from_permille(wdl),
            None => Wdl::from_score(score),
        };
        Assessment { score, wdl }
    }
}

/// Evaluates played moves with the engine, at most two searches per ply.
///
/// The first search finds the engine's best move from the position before
/// the ply. Only when the played move differs is a second search run,
/// restricted to the played move with `searchmoves`.
pub struct MoveEvaluator<'a> {
    session: &'a mut EngineSession,
    depth: u32,
    searches: usize,
}

impl<'a> MoveEvaluator<'a> {
    pub fn new(session: &'a mut EngineSession, depth: u32) -> Self {
        Self {
            session,
            depth,
            searches: 0,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of `go` commands issued so far.
    pub fn searches(&self) -> usize {
        self.searches
    }

    /// Evaluate `played` (UCI) from the position reached by `history`.
    ///
    /// The result is from the point of view of the side to move.
    ///
    /// # Errors
    ///
    /// - `AnalysisError::Analysis` if the engine stops before `bestmove`
    /// - `AnalysisError::EngineIo` on pipe failures or timeouts
    pub async fn evaluate(
        &mut self,
        ply: usize,
        history: &[String],
        played: &str,
    ) -> Result<EvaluationResult, AnalysisError> {
        let first = self
            .search(history, GoOptions::depth(self.depth))
            .await
            .map_err(|e| AnalysisError::during_search(ply, e))?;
        let best_move = first.best_move.clone().unwrap_or_default();
        let best = first.assessment();

        let played_assessment = if best_move == played {
            best
        } else {
            let second = self
                .search(history, GoOptions::depth_searchmoves(self.depth, played))
                .await
                .map_err(|e| AnalysisError::during_search(ply, e))?;
            second.assessment()
        };

        debug!(ply, best = %best_move, played, score = played_assessment.score, "evaluated move");

        Ok(EvaluationResult {
            best_move,
            best,
            played: played_assessment,
        })
    }

    async fn search(&mut self, history: &[String], go: GoOptions) -> Result<SearchReport, EngineError> {
        self.session.send(&GuiCommand::startpos(history)).await?;
        self.session.send(&GuiCommand::Go(go)).await?;
        self.searches += 1;

        let lines = self
            .session
            .await_until(|line| line.starts_with("bestmove"))
            .await?;
        Ok(SearchReport::from_lines(&lines))
    }
}
