//! Newline-delimited JSON messages written to stdout.

use std::io::Write;

use game_analysis::{MoveRecord, PlayerStats};
use serde::Serialize;

/// One line of analyzer output.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message<'a> {
    /// A classified move, in game order.
    Analysis { record: &'a MoveRecord },
    /// Per-player counts, after the last move.
    Summary {
        white: &'a PlayerStats,
        black: &'a PlayerStats,
    },
    /// The run stopped; no more records follow.
    Error { message: String },
}

impl Message<'_> {
    pub fn error(err: impl std::fmt::Display) -> Self {
        Message::Error {
            message: format!("Analysis error: {}", err),
        }
    }

    /// Writes the message as a single line and flushes.
    pub fn emit(&self, out: &mut impl Write) -> std::io::Result<()> {
        serde_json::to_writer(&mut *out, self)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}
