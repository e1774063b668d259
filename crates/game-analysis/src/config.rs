//! Engine process configuration.

use serde::Deserialize;
use std::time::Duration;
use uci::GuiCommand;

fn default_path() -> String {
    "stockfish".to_string()
}

fn default_hash_mb() -> u32 {
    128
}

fn default_threads() -> u32 {
    4
}

fn default_show_wdl() -> bool {
    true
}

fn default_handshake_timeout_ms() -> u64 {
    10_000
}

fn default_response_timeout_ms() -> u64 {
    120_000
}

/// How to start and configure the analysis engine.
///
/// Deserializes from the `[engine]` table of `analyzer.toml`; every field is
/// optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Executable name or path, started without arguments.
    #[serde(default = "default_path")]
    pub path: String,
    /// Transposition table size in MB (`Hash`).
    #[serde(default = "default_hash_mb")]
    pub hash_mb: u32,
    /// Search threads (`Threads`).
    #[serde(default = "default_threads")]
    pub threads: u32,
    /// Whether the engine may think on the opponent's time (`Ponder`).
    #[serde(default)]
    pub ponder: bool,
    /// Ask the engine for win/draw/loss statistics (`UCI_ShowWDL`).
    #[serde(default = "default_show_wdl")]
    pub show_wdl: bool,
    /// Deadline for the whole handshake, in milliseconds.
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    /// Deadline for a single search, in milliseconds.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            hash_mb: default_hash_mb(),
            threads: default_threads(),
            ponder: false,
            show_wdl: default_show_wdl(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }
}

impl EngineConfig {
    /// Config for the engine at `path` with default options.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// `setoption` commands sent during the handshake, in order.
    pub fn options(&self) -> Vec<GuiCommand> {
        vec![
            GuiCommand::set_option("Hash", self.hash_mb),
            GuiCommand::set_option("Threads", self.threads),
            GuiCommand::set_option("Ponder", self.ponder),
            GuiCommand::set_option("UCI_ShowWDL", self.show_wdl),
        ]
    }
}
