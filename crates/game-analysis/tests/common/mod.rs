//! In-process UCI engine for pipeline tests.
//!
//! Speaks UCI over a `tokio::io::duplex` pipe using the `uci` crate's own
//! parser and formatter, and counts what it was asked to do.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use game_analysis::{EngineConfig, EngineError, EngineLauncher, EngineSession};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use uci::{EngineMessage, GoOptions, GuiCommand, InfoBuilder};

/// What the stub reports for one search.
#[derive(Debug, Clone)]
pub struct StubSearch {
    pub best_move: String,
    pub cp: i32,
    pub wdl: Option<(u32, u32, u32)>,
}

impl StubSearch {
    pub fn new(best_move: &str, cp: i32, wdl: (u32, u32, u32)) -> Self {
        Self {
            best_move: best_move.to_string(),
            cp,
            wdl: Some(wdl),
        }
    }

    fn to_lines(&self, depth: u32) -> Vec<String> {
        let mut lines = Vec::new();
        // A shallower, stale estimate first; only the last one counts
        let mut stale = InfoBuilder::new()
            .depth(1)
            .score_cp(self.cp - 500)
            .pv(vec![self.best_move.clone()]);
        if self.wdl.is_some() {
            stale = stale.wdl(0, 0, 1000);
        }
        lines.push(stale.build().to_uci());
        let mut info = InfoBuilder::new()
            .depth(depth)
            .score_cp(self.cp)
            .nodes(1000)
            .pv(vec![self.best_move.clone()]);
        if let Some((w, d, l)) = self.wdl {
            info = info.wdl(w, d, l);
        }
        lines.push(info.build().to_uci());
        lines.push(
            EngineMessage::BestMove {
                mv: self.best_move.clone(),
                ponder: None,
            }
            .to_uci(),
        );
        lines
    }
}

type Script = dyn Fn(&[String], &GoOptions) -> StubSearch + Send + Sync;

/// Counts of what the engine was asked to do.
#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub searches: AtomicUsize,
    pub restricted_searches: AtomicUsize,
    pub quits: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Scripted UCI engine. Cloning shares the counters.
#[derive(Clone)]
pub struct StubEngine {
    script: Arc<Script>,
    pub counters: Arc<Counters>,
    answer_handshake: bool,
    /// Close the pipe when this many searches have been answered.
    crash_after: Option<usize>,
    /// Stop answering when this many searches have been answered.
    hang_after: Option<usize>,
    config: EngineConfig,
}

impl StubEngine {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&[String], &GoOptions) -> StubSearch + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            counters: Arc::new(Counters::default()),
            answer_handshake: true,
            crash_after: None,
            hang_after: None,
            config: EngineConfig::default(),
        }
    }

    /// Always prefers `best`; a search restricted to another move reports
    /// the same score for that move.
    pub fn fixed(best: &str, cp: i32, wdl: (u32, u32, u32)) -> Self {
        let best = best.to_string();
        Self::new(move |_, go| {
            let mv = go.searchmoves.first().unwrap_or(&best);
            StubSearch::new(mv, cp, wdl)
        })
    }

    /// Prefers exactly the moves of `game`, so every played move is best.
    pub fn oracle(game: &[&str], cp: i32, wdl: (u32, u32, u32)) -> Self {
        let game: Vec<String> = game.iter().map(|m| m.to_string()).collect();
        Self::new(move |moves, go| {
            let best = go
                .searchmoves
                .first()
                .or_else(|| game.get(moves.len()))
                .cloned()
                .unwrap_or_else(|| "(none)".to_string());
            StubSearch::new(&best, cp, wdl)
        })
    }

    pub fn silent_handshake(mut self) -> Self {
        self.answer_handshake = false;
        self
    }

    pub fn crashing_after(mut self, searches: usize) -> Self {
        self.crash_after = Some(searches);
        self
    }

    pub fn hanging_after(mut self, searches: usize, response_timeout: Duration) -> Self {
        self.hang_after = Some(searches);
        self.config.response_timeout_ms = response_timeout.as_millis() as u64;
        self
    }

    pub fn searches(&self) -> usize {
        Counters::get(&self.counters.searches)
    }

    pub fn restricted_searches(&self) -> usize {
        Counters::get(&self.counters.restricted_searches)
    }

    pub fn launches(&self) -> usize {
        Counters::get(&self.counters.launches)
    }

    pub fn quits(&self) -> usize {
        Counters::get(&self.counters.quits)
    }

    /// Wait until the session has sent `quit` or the pipe has closed.
    pub async fn wait_closed(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.quits() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("engine was never closed");
    }

    async fn serve(self, io: DuplexStream) {
        let (read, mut write) = tokio::io::split(io);
        let mut lines = BufReader::new(read).lines();
        let mut position: Vec<String> = Vec::new();

        while let Ok(Some(line)) = lines.next_line().await {
            let reply = match GuiCommand::parse(&line) {
                Ok(GuiCommand::Uci) if !self.answer_handshake => return,
                Ok(GuiCommand::Uci) => vec![
                    EngineMessage::Id {
                        name: Some("Stub".to_string()),
                        author: None,
                    }
                    .to_uci(),
                    EngineMessage::UciOk.to_uci(),
                ],
                Ok(GuiCommand::IsReady) => vec![EngineMessage::ReadyOk.to_uci()],
                Ok(GuiCommand::Position { moves, .. }) => {
                    position = moves;
                    Vec::new()
                }
                Ok(GuiCommand::Go(go)) => {
                    let answered = self.counters.searches.fetch_add(1, Ordering::SeqCst);
                    if !go.searchmoves.is_empty() {
                        self.counters.restricted_searches.fetch_add(1, Ordering::SeqCst);
                    }
                    if self.crash_after == Some(answered) {
                        return;
                    }
                    if self.hang_after.is_some_and(|n| answered >= n) {
                        Vec::new()
                    } else {
                        (self.script)(&position, &go).to_lines(go.depth.unwrap_or(1))
                    }
                }
                Ok(GuiCommand::Quit) => {
                    self.counters.quits.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                _ => Vec::new(),
            };

            for reply_line in reply {
                if write.write_all(format!("{}\n", reply_line).as_bytes()).await.is_err() {
                    return;
                }
            }
        }

        // Pipe closed without quit
        self.counters.quits.fetch_add(1, Ordering::SeqCst);
    }
}

impl EngineLauncher for StubEngine {
    fn launch(&self) -> impl Future<Output = Result<EngineSession, EngineError>> + Send {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        let (ours, theirs) = tokio::io::duplex(64 * 1024);
        tokio::spawn(self.clone().serve(theirs));
        let config = self.config.clone();

        async move {
            let (read, write) = tokio::io::split(ours);
            EngineSession::with_io(read, write, &config).await
        }
    }
}

/// UCI moves of the 23-ply game in [`CHESS_COM_GAME`].
pub const CHESS_COM_GAME_UCI: [&str; 23] = [
    "e2e4", "b8c6", "f1c4", "e7e5", "g1f3", "d7d6", "b1c3", "c8g4", "e1g1", "c6d4", "d2d3",
    "d4f3", "g2f3", "g4h5", "c1e3", "d8f6", "c3d5", "f6g6", "g1h1", "e8c8", "f1g1", "g6e6",
    "d5b6",
];

pub const CHESS_COM_GAME: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "player1"]
[Black "player2"]
[Result "1-0"]

1. e4 Nc6 2. Bc4 e5 3. Nf3 d6 4. Nc3 Bg4 5. O-O Nd4 $6 6. d3 $9 Nxf3+ 7. gxf3
Bh5 8. Be3 $6 Qf6 9. Nd5 Qg6+ $2 10. Kh1 O-O-O $6 11. Rg1 $1 Qe6 12. Nb6+ $3 1-0
"#;
