//! UCI commands sent from GUI to engine.

use crate::UciError;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// Next search will be from a different game.
    UciNewGame,
    /// Set an engine option.
    SetOption { name: String, value: Option<String> },
    /// Set up position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
    /// Unknown command (for forward compatibility).
    Unknown(String),
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
    /// White time remaining in milliseconds.
    pub wtime: Option<u64>,
    /// Black time remaining in milliseconds.
    pub btime: Option<u64>,
    /// White increment per move in milliseconds.
    pub winc: Option<u64>,
    /// Black increment per move in milliseconds.
    pub binc: Option<u64>,
    /// Moves to go until next time control.
    pub movestogo: Option<u32>,
    /// Search indefinitely until `stop`.
    pub infinite: bool,
    /// Restrict the search to these moves only.
    pub searchmoves: Vec<String>,
}

impl GoOptions {
    /// Fixed-depth search over all legal moves.
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }

    /// Fixed-depth search restricted to a single move.
    pub fn depth_searchmoves(depth: u32, mv: &str) -> Self {
        Self {
            depth: Some(depth),
            searchmoves: vec![mv.to_string()],
            ..Self::default()
        }
    }

    fn to_uci(&self) -> String {
        let mut parts = vec!["go".to_string()];

        if let Some(d) = self.depth {
            parts.push(format!("depth {}", d));
        }
        if let Some(t) = self.movetime {
            parts.push(format!("movetime {}", t));
        }
        if let Some(t) = self.wtime {
            parts.push(format!("wtime {}", t));
        }
        if let Some(t) = self.btime {
            parts.push(format!("btime {}", t));
        }
        if let Some(t) = self.winc {
            parts.push(format!("winc {}", t));
        }
        if let Some(t) = self.binc {
            parts.push(format!("binc {}", t));
        }
        if let Some(n) = self.movestogo {
            parts.push(format!("movestogo {}", n));
        }
        if self.infinite {
            parts.push("infinite".to_string());
        }
        // searchmoves swallows every following token, so it goes last
        if !self.searchmoves.is_empty() {
            parts.push(format!("searchmoves {}", self.searchmoves.join(" ")));
        }

        parts.join(" ")
    }
}

impl GuiCommand {
    /// Shorthand for `setoption name <name> value <value>`.
    pub fn set_option(name: &str, value: impl ToString) -> Self {
        GuiCommand::SetOption {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Position reached from the standard start by playing `moves`.
    pub fn startpos(moves: &[String]) -> Self {
        GuiCommand::Position {
            fen: None,
            moves: moves.to_vec(),
        }
    }

    /// Format command for sending to the engine.
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::SetOption { name, value } => match value {
                Some(v) => format!("setoption name {} value {}", name, v),
                None => format!("setoption name {}", name),
            },
            GuiCommand::Position { fen, moves } => {
                let mut cmd = match fen {
                    Some(f) => format!("position fen {}", f),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    cmd.push_str(" moves ");
                    cmd.push_str(&moves.join(" "));
                }
                cmd
            }
            GuiCommand::Go(opts) => opts.to_uci(),
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
            GuiCommand::Unknown(raw) => raw.clone(),
        }
    }

    /// Parse a UCI command string.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        let cmd = parts.next().unwrap_or("");

        match cmd {
            "uci" => Ok(GuiCommand::Uci),
            "isready" => Ok(GuiCommand::IsReady),
            "ucinewgame" => Ok(GuiCommand::UciNewGame),
            "stop" => Ok(GuiCommand::Stop),
            "quit" => Ok(GuiCommand::Quit),
            "setoption" => Self::parse_setoption(parts),
            "position" => Self::parse_position(parts),
            "go" => Self::parse_go(parts),
            "" => Err(UciError::InvalidCommand("empty command".to_string())),
            _ => Ok(GuiCommand::Unknown(input.to_string())),
        }
    }

    fn parse_setoption<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let parts: Vec<&str> = parts.collect();
        if parts.first() != Some(&"name") {
            return Err(UciError::ParseError(
                "Expected 'name' after 'setoption'".to_string(),
            ));
        }

        // Option names may contain spaces: everything up to "value" is the name
        let rest = &parts[1..];
        let value_idx = rest.iter().position(|&s| s == "value");
        let (name, value) = match value_idx {
            Some(idx) => (rest[..idx].join(" "), Some(rest[idx + 1..].join(" "))),
            None => (rest.join(" "), None),
        };

        if name.is_empty() {
            return Err(UciError::ParseError("Missing option name".to_string()));
        }

        Ok(GuiCommand::SetOption { name, value })
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let mut fen = None;
        let mut moves = Vec::new();

        // Parse "startpos" or "fen <fen>"
        match parts.next() {
            Some("startpos") => {}
            Some("fen") => {
                // Collect FEN parts until "moves" or end
                let mut fen_parts = Vec::new();
                for part in parts.by_ref() {
                    if part == "moves" {
                        break;
                    }
                    fen_parts.push(part);
                }
                if !fen_parts.is_empty() {
                    fen = Some(fen_parts.join(" "));
                }
            }
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "Expected 'startpos' or 'fen', got '{}'",
                    other
                )));
            }
            None => {
                return Err(UciError::ParseError(
                    "Expected 'startpos' or 'fen'".to_string(),
                ));
            }
        }

        let remaining: Vec<&str> = parts.collect();
        let moves_start = remaining.iter().position(|&s| s == "moves");

        if let Some(idx) = moves_start {
            moves = remaining[idx + 1..].iter().map(|s| s.to_string()).collect();
        } else if fen.is_some() {
            // FEN case already consumed "moves" in the loop
            moves = remaining.iter().map(|s| s.to_string()).collect();
        }

        Ok(GuiCommand::Position { fen, moves })
    }

    fn parse_go<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let mut opts = GoOptions::default();
        let parts: Vec<&str> = parts.collect();
        let mut i = 0;

        while i < parts.len() {
            match parts[i] {
                "movetime" => {
                    i += 1;
                    if i < parts.len() {
                        opts.movetime = parts[i].parse().ok();
                    }
                }
                "depth" => {
                    i += 1;
                    if i < parts.len() {
                        opts.depth = parts[i].parse().ok();
                    }
                }
                "wtime" => {
                    i += 1;
                    if i < parts.len() {
                        opts.wtime = parts[i].parse().ok();
                    }
                }
                "btime" => {
                    i += 1;
                    if i < parts.len() {
                        opts.btime = parts[i].parse().ok();
                    }
                }
                "winc" => {
                    i += 1;
                    if i < parts.len() {
                        opts.winc = parts[i].parse().ok();
                    }
                }
                "binc" => {
                    i += 1;
                    if i < parts.len() {
                        opts.binc = parts[i].parse().ok();
                    }
                }
                "movestogo" => {
                    i += 1;
                    if i < parts.len() {
                        opts.movestogo = parts[i].parse().ok();
                    }
                }
                "infinite" => {
                    opts.infinite = true;
                }
                "searchmoves" => {
                    i += 1;
                    while i < parts.len() && !is_go_keyword(parts[i]) {
                        opts.searchmoves.push(parts[i].to_string());
                        i += 1;
                    }
                    continue;
                }
                _ => {}
            }
            i += 1;
        }

        Ok(GuiCommand::Go(opts))
    }
}

fn is_go_keyword(s: &str) -> bool {
    matches!(
        s,
        "movetime" | "depth" | "wtime" | "btime" | "winc" | "binc" | "movestogo" | "infinite"
            | "searchmoves" | "ponder" | "nodes" | "mate"
    )
}
