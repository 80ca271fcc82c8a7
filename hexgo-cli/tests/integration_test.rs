//! Integration tests for HEXGO
//!
//! Tests the full stack: geometry, board engine, pool, search and the
//! interactive session

use std::io::Cursor;

use hexgo_cli::play::{play_session, SessionConfig};
use hexgo_core::{
    geometry, Board, BoardPool, Cell, Growth, Move, Player, PoolConfig, Position, SearchConfig,
    Searcher,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn pos(row: u8, col: u8) -> Position {
    Position::new(row, col)
}

fn test_pool() -> BoardPool {
    BoardPool::new(
        PoolConfig::default()
            .with_capacity(200_000)
            .with_batch_size(512)
            .with_growth(Growth::OnDemand),
    )
    .unwrap()
}

fn session_config(depth: u32) -> SessionConfig {
    SessionConfig {
        pool: PoolConfig::default()
            .with_capacity(200_000)
            .with_batch_size(512)
            .with_growth(Growth::OnDemand),
        search: SearchConfig::sequential(depth),
        engine: Player::Yellow,
        json: false,
    }
}

fn run_session(config: &SessionConfig, input: &str) -> (anyhow::Result<hexgo_cli::play::SessionSummary>, String) {
    let mut output = Vec::new();
    let result = play_session(config, Cursor::new(input.to_string()), &mut output);
    (result, String::from_utf8(output).unwrap())
}

// ============================================================================
// BOARD ENGINE
// ============================================================================

#[test]
fn test_clone_move_with_conversion_end_to_end() {
    let pool = test_pool();
    let mut board = pool.acquire();
    board.clear();
    board.set(pos(4, 8), Cell::Red);
    board.set(pos(7, 7), Cell::Yellow);
    board.set(pos(8, 8), Cell::Yellow);
    board.set(pos(9, 9), Cell::Yellow);

    let geo = geometry();
    let to = geo.index_of(pos(6, 8)).unwrap();
    let from = geo.index_of(pos(4, 8)).unwrap();
    assert!(geo.is_adjacent(from, to));

    assert!(board.apply(Move::new(pos(4, 8), pos(6, 8))));
    assert_eq!(board.get(pos(4, 8)), Some(Cell::Red));
    assert_eq!(board.get(pos(6, 8)), Some(Cell::Red));
    assert_eq!(board.get(pos(7, 7)), Some(Cell::Red));
    assert_eq!(board.get(pos(8, 8)), Some(Cell::Red));
    assert_eq!(board.get(pos(9, 9)), Some(Cell::Yellow));

    pool.release(board);
}

#[test]
fn test_random_games_keep_pool_balanced() {
    let pool = test_pool();
    let searcher = Searcher::new(SearchConfig::sequential(1).with_branching(4)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1234);

    let mut board = pool.acquire();
    board.setup_standard();

    for _ in 0..12 {
        let best = searcher.best_move(&pool, &board, Player::Yellow);
        let Some(mv) = best.mv() else {
            best.release(&pool);
            break;
        };
        assert!(board.apply(mv));
        best.release(&pool);

        // Random reply from the other side
        let replies = board.legal_moves(Player::Red);
        if let Some(&reply) = replies.choose(&mut rng) {
            assert!(board.apply(reply));
        }

        let total = board.score(Cell::Red) + board.score(Cell::Yellow) + board.score(Cell::Empty);
        assert_eq!(total, hexgo_core::CELL_COUNT);
        assert_eq!(pool.stats().in_use(), 1);
    }

    pool.release(board);
    assert_eq!(pool.stats().in_use(), 0);
}

#[test]
fn test_parallel_search_within_small_pool() {
    let pool = BoardPool::new(
        PoolConfig::default()
            .with_capacity(400)
            .with_batch_size(50)
            .with_poll_interval(std::time::Duration::from_millis(1))
            .with_growth(Growth::OnDemand),
    )
    .unwrap();
    let mut board: Board = pool.acquire();
    board.clear();
    board.set(pos(4, 8), Cell::Red);
    board.set(pos(20, 8), Cell::Yellow);

    let searcher = Searcher::new(SearchConfig::default().with_depth(2).with_threads(2)).unwrap();
    let best = searcher.best_move(&pool, &board, Player::Red);
    assert!(best.mv().is_some());
    best.release(&pool);
    pool.release(board);
    let stats = pool.stats();
    assert_eq!(stats.in_use(), 0);
    assert!(stats.constructed <= 400);
}

// ============================================================================
// INTERACTIVE SESSION
// ============================================================================

#[test]
fn test_session_ends_at_end_of_input() {
    let (result, output) = run_session(&session_config(1), "");
    let summary = result.unwrap();

    assert_eq!(summary.engine_moves, 1);
    assert_eq!(summary.operator_moves_applied, 0);
    assert!(!summary.game_over);
    assert!(output.starts_with("Beginning...\n"));
    assert!(output.contains("   04 05 06 07 08 09 10 11 12 \n"));
    assert!(output.contains("Make: (20,8)-") || output.contains("Make: (8,"));
    assert!(output.ends_with("Their: "));
}

#[test]
fn test_session_prints_reply_chain() {
    let (result, output) = run_session(&session_config(2), "");
    result.unwrap();

    let make = output.lines().position(|l| l.starts_with("Make: ")).unwrap();
    let chain: Vec<&str> = output
        .lines()
        .skip(make + 1)
        .take_while(|l| l.starts_with('\t'))
        .collect();
    assert!(chain.len() <= 2);
    for ply in chain {
        assert!(ply.trim_start().starts_with('('));
    }
}

#[test]
fn test_session_applies_operator_move() {
    let (result, output) = run_session(&session_config(1), "16,4,14,4\n");
    let summary = result.unwrap();

    assert_eq!(summary.engine_moves, 2);
    assert_eq!(summary.operator_moves_applied, 1);
    assert_eq!(output.matches("Their: ").count(), 2);
    assert!(summary.red >= 1);
}

#[test]
fn test_session_ignores_illegal_operator_move() {
    let (result, _) = run_session(&session_config(1), "4,8,10,8\n");
    let summary = result.unwrap();

    assert_eq!(summary.engine_moves, 2);
    assert_eq!(summary.operator_moves_applied, 0);
}

#[test]
fn test_session_malformed_move_is_fatal() {
    let (result, output) = run_session(&session_config(1), "four,eight\n16,4,14,4\n");
    let err = result.unwrap_err();

    assert!(format!("{err:#}").contains("Malformed move command"));
    assert_eq!(output.matches("Make: ").count(), 1);
}

#[test]
fn test_session_json_output() {
    let mut config = session_config(1);
    config.json = true;
    let (result, output) = run_session(&config, "");
    result.unwrap();

    let json_line = output.lines().find(|l| l.starts_with('{')).unwrap();
    let report: serde_json::Value = serde_json::from_str(json_line).unwrap();
    assert_eq!(report["player"], "Yellow");
    let line = report["line"].as_array().unwrap();
    assert!(!line.is_empty());
    assert!(line[0]["move"]["from"]["row"].is_u64());
    assert!(!output.contains("Make: "));
}
