//! Command-line game analyzer.
//!
//! Reads one PGN game, analyzes every move with Stockfish and prints one JSON
//! object per line: an `analysis` line per move as soon as it is classified,
//! an optional `summary` line, or an `error` line if the run fails.

mod config;
mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use game_analysis::{analyze_game_streaming, AnalysisError, AnalysisRequest, GameSummary};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use crate::config::AnalyzerConfig;
use crate::output::Message;

#[derive(Parser)]
#[command(name = "game-analyzer")]
#[command(about = "Classify every move of a chess game with a UCI engine")]
struct Args {
    /// PGN file to analyze; reads stdin when omitted or `-`
    pgn: Option<PathBuf>,

    /// Search depth per position
    #[arg(long)]
    depth: Option<u32>,

    /// Engine executable, overriding the config file
    #[arg(long)]
    engine: Option<String>,

    /// Config file (defaults to ./analyzer.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print per-player totals after the last move
    #[arg(long)]
    summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut config = AnalyzerConfig::load(args.config.as_deref())?;
    if let Some(engine) = args.engine {
        config.engine.path = engine;
    }
    let depth = config.analysis.resolve_depth(args.depth);
    let pgn = read_pgn(args.pgn.as_deref()).await?;

    tracing::info!(engine = %config.engine.path, depth, "Starting analysis");

    let request = AnalysisRequest::new(pgn)
        .with_depth(depth)
        .with_policy(config.classification.clone());
    let mut stream = analyze_game_streaming(request, config.engine.clone());

    let mut stdout = std::io::stdout();
    let mut summary = GameSummary::default();
    while let Some(record) = stream.records.recv().await {
        summary.record(&record);
        Message::Analysis { record: &record }.emit(&mut stdout)?;
    }

    let outcome = stream
        .outcome
        .await
        .unwrap_or(Err(AnalysisError::Interrupted));

    match outcome {
        Ok(()) => {
            tracing::info!(plies = summary.total_plies(), "Analysis complete");
            if args.summary {
                Message::Summary {
                    white: &summary.white,
                    black: &summary.black,
                }
                .emit(&mut stdout)?;
            }
            Ok(())
        }
        Err(e) => {
            Message::error(&e).emit(&mut stdout)?;
            Err(e.into())
        }
    }
}

async fn read_pgn(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read PGN from {}", path.display())),
        _ => {
            let mut pgn = String::new();
            tokio::io::stdin()
                .read_to_string(&mut pgn)
                .await
                .context("Failed to read PGN from stdin")?;
            Ok(pgn)
        }
    }
}
