//! Game replay: walks the main line and assembles one record per ply.

use std::sync::Arc;

use serde::Serialize;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, Move, Position};
use tracing::warn;

use crate::error::AnalysisError;
use crate::evaluation::{Assessment, Side, Wdl};
use crate::evaluator::MoveEvaluator;
use crate::quality::{ClassificationPolicy, MoveQuality};

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// Analysis of one played move.
///
/// Scores are in pawns and, like the probabilities, relative to White so
/// that consecutive records compare directly. `previous` is the baseline the
/// classifier measures against: the assessment after the preceding played
/// move, or for the first ply the engine's best line from the start.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// 0-based ply index.
    pub ply: usize,
    /// Full-move number as printed in PGN.
    pub move_number: u32,
    pub color: Side,
    /// Played move in SAN.
    pub move_text: String,
    /// Played move in UCI notation.
    pub move_uci: String,
    pub played: Assessment,
    pub previous: Assessment,
    /// Engine's best move in UCI notation.
    pub best_move: String,
    /// Engine's best move in SAN, if it is legal in the position.
    #[serde(rename = "bestMoveSAN")]
    pub best_move_san: Option<String>,
    pub best: Assessment,
    /// `(best - played) * 100` from the mover's side.
    pub centipawn_difference: f64,
    pub is_best_move: bool,
    pub classification: MoveQuality,
    pub classification_symbol: &'static str,
}

impl MoveRecord {
    fn for_mover(&self, assessment: Assessment) -> Wdl {
        match self.color {
            Side::White => assessment.wdl,
            Side::Black => assessment.wdl.flipped(),
        }
    }

    /// Change in the mover's win probability since the previous ply.
    pub fn win_delta(&self) -> f64 {
        self.for_mover(self.played).win - self.for_mover(self.previous).win
    }

    /// Change in the mover's loss probability since the previous ply.
    pub fn loss_delta(&self) -> f64 {
        self.for_mover(self.played).loss - self.for_mover(self.previous).loss
    }

    /// Label the record. Engine best moves are always [`MoveQuality::Best`].
    fn classify(&mut self, policy: &dyn ClassificationPolicy) {
        self.classification = if self.is_best_move {
            MoveQuality::Best
        } else {
            policy.classify(self)
        };
        self.classification_symbol = self.classification.symbol();
    }
}

/// Replays a game from the standard starting position, one ply per call.
///
/// A move that is illegal or ambiguous in the running position ends the
/// replay with [`AnalysisError::Replay`]; later plies depend on it.
pub struct GameReplay {
    moves: Vec<SanPlus>,
    position: Chess,
    /// UCI moves played so far.
    history: Vec<String>,
    previous: Option<Assessment>,
    policy: Arc<dyn ClassificationPolicy>,
    ply: usize,
    failed: bool,
}

impl GameReplay {
    pub fn new(moves: Vec<SanPlus>, policy: Arc<dyn ClassificationPolicy>) -> Self {
        Self {
            moves,
            position: Chess::default(),
            history: Vec::new(),
            previous: None,
            policy,
            ply: 0,
            failed: false,
        }
    }

    /// Number of plies in the input.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// UCI moves of the plies replayed so far.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Evaluate the next ply. Returns `None` once the game is finished or
    /// after an error has been returned.
    pub async fn next_record(
        &mut self,
        evaluator: &mut MoveEvaluator<'_>,
    ) -> Option<Result<MoveRecord, AnalysisError>> {
        if self.failed || self.ply >= self.moves.len() {
            return None;
        }

        let result = self.advance(evaluator).await;
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    async fn advance(&mut self, evaluator: &mut MoveEvaluator<'_>) -> Result<MoveRecord, AnalysisError> {
        let ply = self.ply;
        let mv = self.parse_move(ply)?;
        let mover = Side::from(self.position.turn());
        let move_number = self.position.fullmoves().get();
        let move_uci = mv.to_uci(CastlingMode::Standard).to_string();

        let raw = evaluator.evaluate(ply, &self.history, &move_uci).await?;
        let centipawn_difference = raw.centipawn_difference();
        let best_move_san = self.best_move_san(&raw.best_move);
        let result = raw.relative_to_white(mover);

        let move_text = SanPlus::from_move_and_play_unchecked(&mut self.position, &mv).to_string();
        self.history.push(move_uci.clone());

        let mut record = MoveRecord {
            ply,
            move_number,
            color: mover,
            move_text,
            is_best_move: move_uci == result.best_move,
            move_uci,
            played: result.played,
            previous: self.previous.unwrap_or(result.best),
            best_move: result.best_move,
            best_move_san,
            best: result.best,
            centipawn_difference,
            classification: MoveQuality::Neutral,
            classification_symbol: "",
        };
        record.classify(self.policy.as_ref());

        self.previous = Some(record.played);
        self.ply += 1;
        Ok(record)
    }

    fn parse_move(&self, ply: usize) -> Result<Move, AnalysisError> {
        let san = &self.moves[ply];
        san.san
            .to_move(&self.position)
            .map_err(|e| AnalysisError::Replay {
                ply,
                token: san.to_string(),
                reason: e.to_string(),
            })
    }

    /// SAN of the engine's best move in the current (pre-move) position.
    fn best_move_san(&self, best_move: &str) -> Option<String> {
        let mv = UciMove::from_ascii(best_move.as_bytes())
            .ok()
            .and_then(|uci| uci.to_move(&self.position).ok());

        match mv {
            Some(mv) => {
                let mut position = self.position.clone();
                Some(SanPlus::from_move_and_play_unchecked(&mut position, &mv).to_string())
            }
            None => {
                warn!(best_move, ply = self.ply, "engine best move is not legal here");
                None
            }
        }
    }
}
