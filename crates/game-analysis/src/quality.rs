//! Move quality classification and per-player statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluation::Side;
use crate::replay::MoveRecord;

/// Slack for probability comparisons so that thresholds hit exactly by
/// permille arithmetic are inclusive.
const TOLERANCE: f64 = 1e-9;

/// Classification of a played move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MoveQuality {
    /// The engine's own choice.
    Best,
    /// Large gain in winning chances.
    Excellent,
    /// Noticeable gain in winning chances.
    Good,
    /// Little change either way.
    Neutral,
    /// Noticeable loss of winning chances.
    Questionable,
    /// Large loss of winning chances.
    Blunder,
}

impl MoveQuality {
    pub const ALL: [MoveQuality; 6] = [
        MoveQuality::Best,
        MoveQuality::Excellent,
        MoveQuality::Good,
        MoveQuality::Neutral,
        MoveQuality::Questionable,
        MoveQuality::Blunder,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MoveQuality::Best => "Best",
            MoveQuality::Excellent => "Excellent",
            MoveQuality::Good => "Good",
            MoveQuality::Neutral => "Neutral",
            MoveQuality::Questionable => "Questionable",
            MoveQuality::Blunder => "Blunder",
        }
    }

    /// Traditional annotation symbol. Neutral moves get none.
    pub fn symbol(&self) -> &'static str {
        match self {
            MoveQuality::Best => "*",
            MoveQuality::Excellent => "!!",
            MoveQuality::Good => "!",
            MoveQuality::Neutral => "",
            MoveQuality::Questionable => "?",
            MoveQuality::Blunder => "??",
        }
    }
}

impl fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a move record to a quality label.
///
/// Implemented by [`ThresholdPolicy`] and by any
/// `Fn(&MoveRecord) -> MoveQuality + Send + Sync`. Records with
/// `is_best_move` set are labelled [`MoveQuality::Best`] by the replay driver
/// before a policy is consulted.
pub trait ClassificationPolicy: Send + Sync {
    fn classify(&self, record: &MoveRecord) -> MoveQuality;
}

impl<F> ClassificationPolicy for F
where
    F: Fn(&MoveRecord) -> MoveQuality + Send + Sync,
{
    fn classify(&self, record: &MoveRecord) -> MoveQuality {
        self(record)
    }
}

/// Classifies by the change in the mover's win and loss probabilities since
/// the previous ply.
///
/// All thresholds are positive magnitudes in `[0, 1]` and comparisons are
/// inclusive. Checked in order: blunder, questionable, excellent, good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub blunder: f64,
    pub questionable: f64,
    pub excellent: f64,
    pub good: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            blunder: 0.20,
            questionable: 0.10,
            excellent: 0.10,
            good: 0.05,
        }
    }
}

impl ThresholdPolicy {
    /// Label for the given mover-relative changes in win and loss probability.
    pub fn classify_deltas(&self, win_delta: f64, loss_delta: f64) -> MoveQuality {
        let dropped = |limit: f64| win_delta <= -limit + TOLERANCE || loss_delta >= limit - TOLERANCE;
        let gained = |limit: f64| win_delta >= limit - TOLERANCE || loss_delta <= -limit + TOLERANCE;

        if dropped(self.blunder) {
            MoveQuality::Blunder
        } else if dropped(self.questionable) {
            MoveQuality::Questionable
        } else if gained(self.excellent) {
            MoveQuality::Excellent
        } else if gained(self.good) {
            MoveQuality::Good
        } else {
            MoveQuality::Neutral
        }
    }
}

impl ClassificationPolicy for ThresholdPolicy {
    fn classify(&self, record: &MoveRecord) -> MoveQuality {
        if record.is_best_move {
            return MoveQuality::Best;
        }
        self.classify_deltas(record.win_delta(), record.loss_delta())
    }
}

/// Classification counts and centipawn loss for one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_moves: u32,
    pub best_moves: u32,
    pub excellent_moves: u32,
    pub good_moves: u32,
    pub neutral_moves: u32,
    pub questionable_moves: u32,
    pub blunders: u32,
    /// Mean of the positive centipawn differences.
    pub avg_cp_loss: f64,
    #[serde(skip)]
    cp_loss_total: f64,
}

impl PlayerStats {
    pub fn record(&mut self, record: &MoveRecord) {
        self.total_moves += 1;
        match record.classification {
            MoveQuality::Best => self.best_moves += 1,
            MoveQuality::Excellent => self.excellent_moves += 1,
            MoveQuality::Good => self.good_moves += 1,
            MoveQuality::Neutral => self.neutral_moves += 1,
            MoveQuality::Questionable => self.questionable_moves += 1,
            MoveQuality::Blunder => self.blunders += 1,
        }
        self.cp_loss_total += record.centipawn_difference.max(0.0);
        self.avg_cp_loss = self.cp_loss_total / f64::from(self.total_moves);
    }

    pub fn count(&self, quality: MoveQuality) -> u32 {
        match quality {
            MoveQuality::Best => self.best_moves,
            MoveQuality::Excellent => self.excellent_moves,
            MoveQuality::Good => self.good_moves,
            MoveQuality::Neutral => self.neutral_moves,
            MoveQuality::Questionable => self.questionable_moves,
            MoveQuality::Blunder => self.blunders,
        }
    }
}

/// Per-side statistics for a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub white: PlayerStats,
    pub black: PlayerStats,
}

impl GameSummary {
    pub fn from_records(records: &[MoveRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.record(record);
        }
        summary
    }

    pub fn record(&mut self, record: &MoveRecord) {
        match record.color {
            Side::White => self.white.record(record),
            Side::Black => self.black.record(record),
        }
    }

    pub fn total_plies(&self) -> u32 {
        self.white.total_moves + self.black.total_moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{Assessment, Wdl};

    fn assessment(win: f64, draw: f64, loss: f64) -> Assessment {
        Assessment {
            score: 0.0,
            wdl: Wdl { win, draw, loss },
        }
    }

    fn record(color: Side, previous: Assessment, played: Assessment) -> MoveRecord {
        MoveRecord {
            ply: if color == Side::White { 0 } else { 1 },
            move_number: 1,
            color,
            move_text: "Nf3".to_string(),
            move_uci: "g1f3".to_string(),
            played,
            previous,
            best_move: "e2e4".to_string(),
            best_move_san: Some("e4".to_string()),
            best: previous,
            centipawn_difference: 0.0,
            is_best_move: false,
            classification: MoveQuality::Neutral,
            classification_symbol: "",
        }
    }

    #[test]
    fn test_labels_and_symbols() {
        let symbols: Vec<&str> = MoveQuality::ALL.iter().map(|q| q.symbol()).collect();
        assert_eq!(symbols, vec!["*", "!!", "!", "", "?", "??"]);
        assert_eq!(MoveQuality::Questionable.label(), "Questionable");
        assert_eq!(MoveQuality::Blunder.to_string(), "Blunder");
    }

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.classify_deltas(-0.20, 0.0), MoveQuality::Blunder);
        assert_eq!(policy.classify_deltas(0.0, 0.20), MoveQuality::Blunder);
        assert_eq!(policy.classify_deltas(-0.19, 0.0), MoveQuality::Questionable);
        assert_eq!(policy.classify_deltas(-0.10, 0.0), MoveQuality::Questionable);
        assert_eq!(policy.classify_deltas(-0.09, 0.0), MoveQuality::Neutral);
        assert_eq!(policy.classify_deltas(0.10, 0.0), MoveQuality::Excellent);
        assert_eq!(policy.classify_deltas(0.0, -0.10), MoveQuality::Excellent);
        assert_eq!(policy.classify_deltas(0.05, 0.0), MoveQuality::Good);
        assert_eq!(policy.classify_deltas(0.0, -0.05), MoveQuality::Good);
        assert_eq!(policy.classify_deltas(0.04, -0.04), MoveQuality::Neutral);
    }

    #[test]
    fn test_losses_take_precedence_over_gains() {
        let policy = ThresholdPolicy::default();
        // Win up but loss up more: still a blunder
        assert_eq!(policy.classify_deltas(0.15, 0.25), MoveQuality::Blunder);
    }

    #[test]
    fn test_permille_arithmetic_hits_threshold() {
        // 0.55 - 0.35 is slightly below 0.2 in floating point
        let policy = ThresholdPolicy::default();
        let white = record(Side::White, assessment(0.55, 0.3, 0.15), assessment(0.35, 0.3, 0.35));
        assert_eq!(policy.classify(&white), MoveQuality::Blunder);
    }

    #[test]
    fn test_black_deltas_use_black_perspective() {
        let policy = ThresholdPolicy::default();
        // Stored White-relative: White's win rose from 0.3 to 0.6, so Black lost 0.3
        let black = record(Side::Black, assessment(0.3, 0.4, 0.3), assessment(0.6, 0.3, 0.1));
        assert!((black.win_delta() - -0.2).abs() < 1e-9);
        assert!((black.loss_delta() - 0.3).abs() < 1e-9);
        assert_eq!(policy.classify(&black), MoveQuality::Blunder);

        let white = record(Side::White, assessment(0.3, 0.4, 0.3), assessment(0.6, 0.3, 0.1));
        assert_eq!(policy.classify(&white), MoveQuality::Excellent);
    }

    #[test]
    fn test_best_move_short_circuits() {
        let policy = ThresholdPolicy::default();
        let mut rec = record(Side::White, assessment(0.9, 0.1, 0.0), assessment(0.1, 0.1, 0.8));
        rec.is_best_move = true;
        assert_eq!(policy.classify(&rec), MoveQuality::Best);
    }

    #[test]
    fn test_closure_policy() {
        let policy = |rec: &MoveRecord| {
            if rec.move_text.starts_with('N') {
                MoveQuality::Excellent
            } else {
                MoveQuality::Neutral
            }
        };
        let rec = record(Side::White, assessment(0.5, 0.0, 0.5), assessment(0.5, 0.0, 0.5));
        assert_eq!(policy.classify(&rec), MoveQuality::Excellent);
    }

    #[test]
    fn test_policy_from_partial_config() {
        let policy: ThresholdPolicy = serde_json::from_str(r#"{"blunder": 0.3}"#).unwrap();
        assert_eq!(policy.blunder, 0.3);
        assert_eq!(policy.good, 0.05);
    }

    #[test]
    fn test_summary_counts_per_side() {
        let mut white = record(Side::White, assessment(0.5, 0.0, 0.5), assessment(0.5, 0.0, 0.5));
        white.classification = MoveQuality::Best;
        white.centipawn_difference = 0.0;

        let mut black = record(Side::Black, assessment(0.5, 0.0, 0.5), assessment(0.5, 0.0, 0.5));
        black.classification = MoveQuality::Blunder;
        black.centipawn_difference = 250.0;

        let mut white_again = white.clone();
        white_again.classification = MoveQuality::Good;
        white_again.centipawn_difference = -40.0;

        let summary = GameSummary::from_records(&[white, black, white_again]);
        assert_eq!(summary.total_plies(), 3);
        assert_eq!(summary.white.count(MoveQuality::Best), 1);
        assert_eq!(summary.white.count(MoveQuality::Good), 1);
        assert_eq!(summary.white.avg_cp_loss, 0.0);
        assert_eq!(summary.black.blunders, 1);
        assert_eq!(summary.black.avg_cp_loss, 250.0);
    }
}
