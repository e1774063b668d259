//! Main-line extraction from PGN text.
//!
//! Only the first game is read. Tags, comments, NAGs and the result are
//! ignored and variations are skipped, leaving the main line's moves in order.

use pgn_reader::{BufferedReader, SanPlus, Skip, Visitor};
use tracing::warn;

/// Collects the SAN moves of one game, skipping variations.
#[derive(Debug, Default)]
struct MainLine {
    moves: Vec<SanPlus>,
}

impl Visitor for MainLine {
    type Result = Vec<SanPlus>;

    fn begin_game(&mut self) {
        self.moves.clear();
    }

    fn san(&mut self, san_plus: SanPlus) {
        self.moves.push(san_plus);
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true)
    }

    fn end_game(&mut self) -> Self::Result {
        std::mem::take(&mut self.moves)
    }
}

/// Main-line moves of the first game in `pgn`.
///
/// Moves are not checked against the position here; illegal moves surface
/// when the game is replayed. Text that contains no game yields no moves.
pub fn main_line(pgn: &str) -> Vec<SanPlus> {
    let pgn = pgn.trim_start_matches('\u{feff}');
    let mut reader = BufferedReader::new_cursor(pgn.as_bytes());
    let mut visitor = MainLine::default();

    match reader.read_game(&mut visitor) {
        Ok(Some(moves)) => moves,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read PGN");
            Vec::new()
        }
    }
}
