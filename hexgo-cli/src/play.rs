//! Play command - interactive game against the engine
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() / play_session() - orchestration
//! - Level 2: engine_turn(), operator_turn()
//! - Level 3: report formatting
//! - Level 4: configuration

use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use hexgo_core::{
    Board, BoardPool, Cell, Move, Player, PoolConfig, SearchConfig, Searcher, Trial,
};

use crate::render::render;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Colour choice on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Side {
    Red,
    Yellow,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::Red => Player::Red,
            Side::Yellow => Player::Yellow,
        }
    }
}

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Colour the engine plays (it always moves first)
    #[arg(long, value_enum, default_value = "yellow")]
    pub engine: Side,

    /// Search depth in plies below the immediate moves
    #[arg(long, default_value = "6")]
    pub depth: u32,

    /// Candidates expanded per search node
    #[arg(long, default_value = "10")]
    pub branching: usize,

    /// Expand top-level candidates on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Worker threads for the top-level expansion (default: one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Maximum number of board snapshots
    #[arg(long, default_value = "2500000")]
    pub capacity: usize,

    /// Snapshots constructed per growth step
    #[arg(long, default_value = "1000")]
    pub batch_size: usize,

    /// Poll interval in milliseconds while the pool is exhausted
    #[arg(long, default_value = "200")]
    pub poll_ms: u64,

    /// Print each recommendation as a JSON line
    #[arg(long)]
    pub json: bool,
}

impl PlayArgs {
    /// Build the session configuration
    pub fn session_config(&self) -> SessionConfig {
        let mut search = SearchConfig::default()
            .with_depth(self.depth)
            .with_branching(self.branching)
            .with_parallel(!self.sequential);
        search.threads = self.threads;

        SessionConfig {
            pool: PoolConfig::default()
                .with_capacity(self.capacity)
                .with_batch_size(self.batch_size)
                .with_poll_interval(Duration::from_millis(self.poll_ms)),
            search,
            engine: self.engine.into(),
            json: self.json,
        }
    }
}

/// Everything a session needs
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub pool: PoolConfig,
    pub search: SearchConfig,
    pub engine: Player,
    pub json: bool,
}

/// How a session went
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Moves the engine made
    pub engine_moves: usize,
    /// Operator moves that were actually legal
    pub operator_moves_applied: usize,
    /// The engine ran out of legal moves
    pub game_over: bool,
    pub red: usize,
    pub yellow: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command on stdin/stdout
pub fn run(args: PlayArgs) -> Result<()> {
    let config = args.session_config();

    tracing::info!(
        "Starting game: engine plays {} (depth={}, branching={}, parallel={})",
        config.engine,
        config.search.depth,
        config.search.branching,
        config.search.parallel
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let summary = play_session(&config, stdin.lock(), stdout.lock())?;

    tracing::info!(
        "Session ended after {} engine moves: Red {} - Yellow {}",
        summary.engine_moves,
        summary.red,
        summary.yellow
    );

    Ok(())
}

/// Play until the engine has no move or input ends
///
/// This function reads like a table of contents:
/// 1. Build pool and searcher, set up the opening
/// 2. Alternate engine and operator turns
/// 3. Hand the root board back
pub fn play_session<R: BufRead, W: Write>(
    config: &SessionConfig,
    mut input: R,
    mut output: W,
) -> Result<SessionSummary> {
    let pool = BoardPool::new(config.pool.clone()).context("Invalid pool configuration")?;
    let searcher = Searcher::new(config.search.clone()).context("Failed to create searcher")?;

    let mut board = pool.acquire();
    board.setup_standard();

    writeln!(output, "Beginning...")?;
    let outcome = play_turns(config, &pool, &searcher, &mut board, &mut input, &mut output);

    let summary = outcome.map(|mut summary| {
        summary.red = board.score(Cell::Red);
        summary.yellow = board.score(Cell::Yellow);
        summary
    });
    pool.release(board);
    summary
}

fn play_turns<R: BufRead, W: Write>(
    config: &SessionConfig,
    pool: &BoardPool,
    searcher: &Searcher,
    board: &mut Board,
    input: &mut R,
    output: &mut W,
) -> Result<SessionSummary> {
    let mut summary = SessionSummary {
        engine_moves: 0,
        operator_moves_applied: 0,
        game_over: false,
        red: 0,
        yellow: 0,
    };

    loop {
        let best = searcher.best_move(pool, board, config.engine);
        if !engine_turn(config, &best, board, output)? {
            best.release(pool);
            summary.game_over = true;
            return Ok(summary);
        }
        summary.engine_moves += 1;

        let applied = operator_turn(board, input, output);
        best.release(pool);
        match applied? {
            Some(true) => summary.operator_moves_applied += 1,
            Some(false) => {}
            None => return Ok(summary),
        }
    }
}

// ============================================================================
// LEVEL 2 - TURNS
// ============================================================================

/// Play the recommendation and print it; false if the engine had no move
fn engine_turn<W: Write>(
    config: &SessionConfig,
    best: &Trial,
    board: &mut Board,
    output: &mut W,
) -> Result<bool> {
    let Some(mv) = best.mv() else {
        write!(output, "{}", render(board))?;
        writeln!(
            output,
            "{} has no legal move. Red {} - Yellow {}",
            config.engine,
            board.score(Cell::Red),
            board.score(Cell::Yellow)
        )?;
        return Ok(false);
    };

    board.apply(mv);
    write!(output, "{}", render(board))?;

    if config.json {
        let report = LineReport::from_trial(best);
        writeln!(output, "{}", serde_json::to_string(&report)?)?;
    } else {
        writeln!(output, "Make: {mv}")?;
        for reply in best.line().skip(1) {
            writeln!(output, "\t{}", describe_ply(reply))?;
        }
    }

    Ok(true)
}

/// Read and apply the operator's move
///
/// None at end of input. A malformed command is an error; an illegal move is
/// applied anyway and simply has no effect.
fn operator_turn<R: BufRead, W: Write>(
    board: &mut Board,
    input: &mut R,
    output: &mut W,
) -> Result<Option<bool>> {
    write!(output, "Their: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let command = line.trim();
    let theirs: Move = command
        .parse()
        .with_context(|| format!("Malformed move command: {command:?}"))?;

    let applied = board.apply(theirs);
    tracing::debug!(%theirs, applied, "operator move");

    Ok(Some(applied))
}

// ============================================================================
// LEVEL 3 - REPORTING
// ============================================================================

fn describe_ply(trial: &Trial) -> String {
    match trial.mv() {
        Some(mv) => mv.to_string(),
        None => format!("{} has no legal move", trial.player()),
    }
}

/// JSON form of a recommended line
#[derive(Debug, Serialize)]
pub struct LineReport {
    pub player: Player,
    pub score: i32,
    pub line: Vec<PlyReport>,
}

#[derive(Debug, Serialize)]
pub struct PlyReport {
    pub player: Player,
    #[serde(rename = "move")]
    pub mv: Option<Move>,
    pub score: i32,
    pub terminal: bool,
}

impl LineReport {
    pub fn from_trial(best: &Trial) -> Self {
        Self {
            player: best.player(),
            score: best.score(),
            line: best
                .line()
                .map(|t| PlyReport {
                    player: t.player(),
                    mv: t.mv(),
                    score: t.score(),
                    terminal: t.is_terminal(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
