//! Integration tests for game-analysis against a real engine.
//!
//! These tests require Stockfish to be installed and available in PATH.
//! Run with: `cargo test -p game-analysis --test integration -- --ignored`

use game_analysis::{
    analyze_game, AnalysisError, AnalysisRequest, EngineConfig, EngineSession, MoveEvaluator,
    MoveQuality,
};

/// Check if Stockfish is available in PATH.
fn stockfish_available() -> bool {
    std::process::Command::new("stockfish")
        .arg("quit")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}

#[tokio::test]
#[ignore = "requires Stockfish"]
async fn test_session_handshake_and_search() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let mut session = EngineSession::open(&EngineConfig::default())
        .await
        .expect("Failed to start Stockfish");

    let name = session.name().unwrap_or_default().to_lowercase();
    assert!(name.contains("stockfish"), "unexpected engine name: {}", name);

    let mut evaluator = MoveEvaluator::new(&mut session, 8);
    let result = evaluator
        .evaluate(0, &[], "e2e4")
        .await
        .expect("Failed to evaluate 1. e4");

    assert!(!result.best_move.is_empty());
    assert!(result.best.wdl.win + result.best.wdl.draw + result.best.wdl.loss > 0.99);
    assert!(evaluator.searches() <= 2);

    session.close().await;
    assert!(!session.is_ready());
}

#[tokio::test]
#[ignore = "requires Stockfish"]
async fn test_scholars_mate_blunder() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    // 3...Nf6?? allows Qxf7#
    let pgn = "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0";
    let analysis = analyze_game(AnalysisRequest::new(pgn).with_depth(10), EngineConfig::default())
        .await
        .expect("Failed to analyze game");

    assert_eq!(analysis.moves.len(), 7);

    let nf6 = &analysis.moves[5];
    assert_eq!(nf6.move_text, "Nf6");
    assert_eq!(nf6.classification, MoveQuality::Blunder);
    assert!(nf6.centipawn_difference > 300.0);

    let mate = &analysis.moves[6];
    assert_eq!(mate.move_text, "Qxf7#");
    assert!(mate.is_best_move);
    assert_eq!(mate.classification, MoveQuality::Best);

    assert_eq!(analysis.summary.black.blunders, 1);
}

#[tokio::test]
#[ignore = "requires Stockfish"]
async fn test_invalid_move_reports_replay_error() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let result = analyze_game(
        AnalysisRequest::new("1. e4 e5 2. Qh6"),
        EngineConfig::default(),
    )
    .await;

    assert!(matches!(result, Err(AnalysisError::Replay { ply: 2, .. })));
}
