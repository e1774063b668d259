//! Position assessments and their perspective conversions.

use serde::Serialize;
use uci::Score;

/// Centipawn value of a mate in zero. A mate in N scores `MATE_SCORE_CP - N`.
pub const MATE_SCORE_CP: i32 = 10_000;

/// Which side played a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Side to move at `ply` (0-based) from the standard starting position.
    pub fn at_ply(ply: usize) -> Self {
        if ply % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }
}

/// Win/draw/loss probabilities in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wdl {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl Wdl {
    /// Convert an engine `wdl` triple given in permille.
    pub fn from_permille(wdl: uci::Wdl) -> Self {
        Self {
            win: f64::from(wdl.win) / 1000.0,
            draw: f64::from(wdl.draw) / 1000.0,
            loss: f64::from(wdl.loss) / 1000.0,
        }
    }

    /// Estimate from a score in pawns when the engine sends no `wdl`.
    ///
    /// Uses the logistic curve `1 / (1 + e^(-cp/100))` and leaves no room for
    /// draws.
    pub fn from_score(pawns: f64) -> Self {
        let win = 1.0 / (1.0 + (-pawns).exp());
        Self {
            win,
            draw: 0.0,
            loss: 1.0 - win,
        }
    }

    /// The same probabilities seen by the other side.
    pub fn flipped(self) -> Self {
        Self {
            win: self.loss,
            draw: self.draw,
            loss: self.win,
        }
    }
}

/// Score and outcome probabilities for one side of a position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Score in pawns.
    pub score: f64,
    #[serde(flatten)]
    pub wdl: Wdl,
}

impl Assessment {
    pub fn flipped(self) -> Self {
        Self {
            score: -self.score,
            wdl: self.wdl.flipped(),
        }
    }
}

/// Convert an engine score to pawns.
///
/// Mate scores map to `±(MATE_SCORE_CP - |N|)` centipawns so that faster
/// mates rank higher.
pub fn score_to_pawns(score: Score) -> f64 {
    let cp = match score {
        Score::Cp(cp) => cp,
        Score::Mate(n) if n >= 0 => MATE_SCORE_CP - n,
        Score::Mate(n) => -(MATE_SCORE_CP + n),
    };
    f64::from(cp) / 100.0
}

/// Engine verdict on one ply: its preferred move and how both that move and
/// the played move score.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    /// Engine's best move in UCI notation.
    pub best_move: String,
    pub best: Assessment,
    pub played: Assessment,
}

impl EvaluationResult {
    /// Re-express a result reported for `mover` from White's point of view.
    ///
    /// Engines report from the side to move, so a Black result has its scores
    /// negated and win/loss swapped.
    pub fn relative_to_white(self, mover: Side) -> Self {
        match mover {
            Side::White => self,
            Side::Black => Self {
                best_move: self.best_move,
                best: self.best.flipped(),
                played: self.played.flipped(),
            },
        }
    }

    /// `(best - played) * 100`, from the mover's point of view.
    pub fn centipawn_difference(&self) -> f64 {
        (self.best.score - self.played.score) * 100.0
    }
}
