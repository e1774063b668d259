//! UCI (Universal Chess Interface) protocol library.
//!
//! This crate provides types, parsing and formatting for the subset of the UCI
//! protocol a GUI needs to drive an engine such as Stockfish.
//!
//! # GUI to engine
//!
//! - `uci` - Initialize engine, get id and options
//! - `setoption name <id> [value <x>]` - Configure engine
//! - `isready` / `readyok` - Synchronization
//! - `ucinewgame` - Reset engine state between games
//! - `position startpos|fen <fen> [moves <move>...]` - Set position
//! - `go [depth <d>] [movetime <ms>] [searchmoves <move>...]` - Start search
//! - `stop` - Stop search
//! - `quit` - Exit engine
//!
//! # Engine to GUI
//!
//! - `id name|author <x>`, `uciok`, `readyok`
//! - `info ... score cp|mate <x> wdl <w> <d> <l> ... pv <moves>`
//! - `bestmove <move> [ponder <move>]`

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, InfoBuilder, Score, Wdl};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id { name: Option<String>, author: Option<String> },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found.
    BestMove { mv: String, ponder: Option<String> },
}

impl EngineMessage {
    /// Format message for output.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::Id { name, author } => {
                let mut parts = Vec::new();
                if let Some(n) = name {
                    parts.push(format!("id name {}", n));
                }
                if let Some(a) = author {
                    parts.push(format!("id author {}", a));
                }
                parts.join("\n")
            }
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(info) => info.to_uci(),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("bestmove {} ponder {}", mv, p),
                None => format!("bestmove {}", mv),
            },
        }
    }

    /// Parse a single line of engine output.
    ///
    /// Returns `None` for lines this crate does not model (`option ...`,
    /// `copyprotection`, banners printed before `uci`).
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next()? {
            "uciok" => Some(EngineMessage::UciOk),
            "readyok" => Some(EngineMessage::ReadyOk),
            "info" => EngineInfo::parse(line).map(EngineMessage::Info),
            "bestmove" => {
                let mv = parts.next()?.to_string();
                let ponder = match parts.next() {
                    Some("ponder") => parts.next().map(|p| p.to_string()),
                    _ => None,
                };
                Some(EngineMessage::BestMove { mv, ponder })
            }
            "id" => {
                let rest: Vec<&str> = parts.collect();
                match rest.split_first() {
                    Some((&"name", value)) => Some(EngineMessage::Id {
                        name: Some(value.join(" ")),
                        author: None,
                    }),
                    Some((&"author", value)) => Some(EngineMessage::Id {
                        name: None,
                        author: Some(value.join(" ")),
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}
