//! Bounded best-first search over pool-allocated boards
//!
//! Every candidate move gets its own snapshot from the pool and an immediate
//! score (the mover's piece differential). The best `branching` candidates
//! are expanded by searching the opponent's reply one ply deeper; a child's
//! score is adopted by its parent unchanged, without flipping perspective.
//! Only the winning line keeps its snapshots; everything else goes back to
//! the pool before the call returns.
//!
//! ## Architecture
//! - Level 2: Searcher (worker pool, top-level call)
//! - Level 3: search recursion, expansion, selection, reclamation
//! - Level 4: Trial accessors and release

use std::cmp::Reverse;

use rayon::prelude::*;

use crate::board::{Board, Move, Player};
use crate::config::SearchConfig;
use crate::error::HexgoError;
use crate::pool::{BoardPool, PoolAccess};

// ============================================================================
// TRIAL
// ============================================================================

/// One node of the search tree
///
/// Owns the snapshot its move produced and the best reply below it. A
/// terminal trial (the player had no legal move) owns no snapshot and has no
/// move. Whoever ends up holding a trial must hand it back with
/// [`Trial::release`].
#[derive(Debug)]
#[must_use = "trials hold pool snapshots and must be released"]
pub struct Trial {
    board: Option<Board>,
    player: Player,
    mv: Option<Move>,
    score: i32,
    terminal: bool,
    best_response: Option<Box<Trial>>,
}

impl Trial {
    /// Trial for a player with no legal move at `board`
    fn terminal(board: &Board, player: Player) -> Self {
        Self {
            board: None,
            player,
            mv: None,
            score: board.score(player.into()) as i32,
            terminal: true,
            best_response: None,
        }
    }

    /// Board after this trial's move; None for a terminal trial
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Player who made (or could not make) the move
    pub fn player(&self) -> Player {
        self.player
    }

    pub fn mv(&self) -> Option<Move> {
        self.mv
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn best_response(&self) -> Option<&Trial> {
        self.best_response.as_deref()
    }

    /// This trial followed by its chain of best responses
    pub fn line(&self) -> impl Iterator<Item = &Trial> {
        std::iter::successors(Some(self), |t| t.best_response())
    }

    /// Return this trial's snapshot and every snapshot along its chain
    pub fn release(self, pool: &BoardPool) {
        pool.access(|a| self.release_with(a));
    }

    /// Release inside an already-held critical section
    ///
    /// The deepest snapshot goes back first, so the head of the chain is
    /// the next one reused.
    pub fn release_with(self, access: &mut PoolAccess<'_>) {
        let mut boards = Vec::new();
        let mut next = Some(self);
        while let Some(trial) = next {
            boards.extend(trial.board);
            next = trial.best_response.map(|b| *b);
        }
        for board in boards.into_iter().rev() {
            access.release(board);
        }
    }
}

// ============================================================================
// SEARCHER (Level 2)
// ============================================================================

/// Move recommender
pub struct Searcher {
    config: SearchConfig,
    workers: Option<rayon::ThreadPool>,
}

impl Searcher {
    /// Create a searcher; a parallel config gets its own worker pool
    pub fn new(config: SearchConfig) -> Result<Self, HexgoError> {
        config.validate()?;

        let workers = if config.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads.unwrap_or(0))
                .thread_name(|i| format!("hexgo-search-{i}"))
                .build()?;
            Some(pool)
        } else {
            None
        };

        Ok(Self { config, workers })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Recommend a move for `player` at `board`
    ///
    /// The returned trial keeps its snapshots until released.
    pub fn best_move(&self, pool: &BoardPool, board: &Board, player: Player) -> Trial {
        let best = search(
            pool,
            board,
            player,
            self.config.depth,
            self.config.branching,
            self.workers.as_ref(),
        );

        match best.mv {
            Some(mv) => tracing::debug!(
                %player,
                %mv,
                score = best.score,
                plies = best.line().count(),
                "search complete"
            ),
            None => tracing::debug!(%player, score = best.score, "no legal move"),
        }

        best
    }
}

// ============================================================================
// SEARCH (Level 3)
// ============================================================================

/// One search call: enumerate, score, expand, select, reclaim
///
/// `workers` is only honoured here; recursive calls run sequentially.
fn search(
    pool: &BoardPool,
    board: &Board,
    player: Player,
    depth: u32,
    branching: usize,
    workers: Option<&rayon::ThreadPool>,
) -> Trial {
    let moves = board.legal_moves(player);
    if moves.is_empty() {
        return Trial::terminal(board, player);
    }

    let mut trials: Vec<Trial> = pool.access(|a| {
        moves
            .iter()
            .map(|&mv| Trial {
                board: Some(a.acquire_copy(board)),
                player,
                mv: Some(mv),
                score: 0,
                terminal: false,
                best_response: None,
            })
            .collect()
    });

    for trial in &mut trials {
        if let (Some(board), Some(mv)) = (trial.board.as_mut(), trial.mv) {
            board.apply(mv);
            trial.score = board.differential(player);
        }
    }

    if depth > 0 {
        let selected = top_candidates(&trials, branching);
        let expand = |trial: &mut Trial| {
            if let Some(board) = trial.board.as_ref() {
                let response = search(pool, board, player.opponent(), depth - 1, branching, None);
                trial.score = response.score;
                trial.best_response = Some(Box::new(response));
            }
        };

        match workers {
            Some(workers) => workers.install(|| {
                trials
                    .par_iter_mut()
                    .enumerate()
                    .filter(|(i, _)| selected[*i])
                    .for_each(|(_, trial)| expand(trial))
            }),
            None => trials
                .iter_mut()
                .enumerate()
                .filter(|(i, _)| selected[*i])
                .for_each(|(_, trial)| expand(trial)),
        }
    }

    let winner = trials.remove(first_best(&trials));
    pool.access(|a| {
        for trial in trials {
            trial.release_with(a);
        }
    });

    winner
}

/// Flags the `branching` highest immediate scores, ties in enumeration order
fn top_candidates(trials: &[Trial], branching: usize) -> Vec<bool> {
    let mut order: Vec<usize> = (0..trials.len()).collect();
    order.sort_by_key(|&i| Reverse(trials[i].score));

    let mut selected = vec![false; trials.len()];
    for &i in order.iter().take(branching) {
        selected[i] = true;
    }
    selected
}

/// Index of the first trial with the maximum score
fn first_best(trials: &[Trial]) -> usize {
    let mut best = 0;
    for (i, trial) in trials.iter().enumerate().skip(1) {
        if trial.score > trials[best].score {
            best = i;
        }
    }
    best
}

// ============================================================================
// TESTS
// ============================================================================
