//! Board pool: a capacity-bounded arena of reusable board snapshots
//!
//! Snapshots are built in fixed-size batches, either by a background grower
//! thread or inline on demand, up to a fixed capacity. Released snapshots go
//! onto a LIFO reuse stack and are handed out again before any fresh one.
//!
//! All bookkeeping sits behind one mutex. A caller takes it once through
//! [`BoardPool::access`] and performs a whole batch of acquisitions and
//! releases inside that critical section.
//!
//! ## Architecture
//! - Level 2: BoardPool (service object, grower lifecycle)
//! - Level 3: PoolAccess (acquire/release under the lock)
//! - Level 4: statistics

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::board::Board;
use crate::config::{Growth, PoolConfig};
use crate::error::ConfigError;

// ============================================================================
// SHARED STATE
// ============================================================================

/// Bookkeeping guarded by the pool mutex
#[derive(Debug)]
struct PoolState {
    /// Released snapshots, most recent last
    freed: Vec<Board>,
    /// Constructed but never handed out, lowest slot first
    fresh: VecDeque<Board>,
    /// Snapshots built so far
    constructed: usize,
    /// Snapshots handed out fresh so far (next never-used slot)
    handed_out: usize,
}

#[derive(Debug)]
struct Shared {
    config: PoolConfig,
    state: Mutex<PoolState>,
    /// Signalled on release and whenever a batch lands
    available: Condvar,
    shutdown: AtomicBool,
}

impl Shared {
    /// Build the next batch of vacant snapshots starting at `first_slot`
    fn build_batch(&self, first_slot: usize) -> Vec<Board> {
        let end = (first_slot + self.config.batch_size).min(self.config.capacity);
        (first_slot..end).map(Board::vacant).collect()
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Point-in-time pool counters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub constructed: usize,
    pub handed_out: usize,
    pub free: usize,
}

impl PoolStats {
    /// Snapshots currently owned by callers
    pub fn in_use(&self) -> usize {
        self.handed_out - self.free
    }
}

// ============================================================================
// BOARD POOL (Level 2)
// ============================================================================

/// Arena of reusable board snapshots
///
/// Pass it by reference to whatever needs snapshots. Dropping the pool stops
/// the background grower after its current batch.
#[derive(Debug)]
pub struct BoardPool {
    shared: Arc<Shared>,
    grower: Option<JoinHandle<()>>,
}

impl BoardPool {
    /// Create a pool and, for [`Growth::Background`], start the grower thread
    pub fn new(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                freed: Vec::new(),
                fresh: VecDeque::new(),
                constructed: 0,
                handed_out: 0,
            }),
            available: Condvar::new(),
            shutdown: AtomicBool::new(false),
            config,
        });

        let grower = match shared.config.growth {
            Growth::Background => {
                let shared = Arc::clone(&shared);
                Some(thread::spawn(move || grow(&shared)))
            }
            Growth::OnDemand => None,
        };

        Ok(Self { shared, grower })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Run `f` inside one critical section
    pub fn access<T>(&self, f: impl FnOnce(&mut PoolAccess<'_>) -> T) -> T {
        let mut access = PoolAccess {
            shared: &self.shared,
            state: self.shared.state.lock(),
        };
        f(&mut access)
    }

    /// Acquire a single snapshot (locks once)
    pub fn acquire(&self) -> Board {
        self.access(|a| a.acquire())
    }

    /// Acquire a snapshot holding a copy of `source` (locks once)
    pub fn acquire_copy(&self, source: &Board) -> Board {
        self.access(|a| a.acquire_copy(source))
    }

    /// Release a single snapshot (locks once)
    pub fn release(&self, board: Board) {
        self.access(|a| a.release(board))
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        PoolStats {
            capacity: self.shared.config.capacity,
            constructed: state.constructed,
            handed_out: state.handed_out,
            free: state.freed.len(),
        }
    }

    /// Block until the whole capacity has been constructed
    pub fn wait_until_grown(&self) {
        let mut state = self.shared.state.lock();
        while state.constructed < self.shared.config.capacity {
            if self.shared.config.growth == Growth::OnDemand {
                let batch = self.shared.build_batch(state.constructed);
                state.constructed += batch.len();
                state.fresh.extend(batch);
                continue;
            }
            self.shared
                .available
                .wait_for(&mut state, self.shared.config.poll_interval);
        }
    }
}

impl Drop for BoardPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.grower.take() {
            if handle.join().is_err() {
                tracing::warn!("board pool grower thread panicked");
            }
        }
    }
}

/// Background grower: build batches outside the lock, publish them under it
fn grow(shared: &Shared) {
    let capacity = shared.config.capacity;
    let mut constructed = 0;

    while constructed < capacity {
        if shared.shutdown.load(Ordering::Relaxed) {
            tracing::debug!(constructed, "board pool grower stopped early");
            return;
        }

        let batch = shared.build_batch(constructed);
        constructed += batch.len();

        let mut state = shared.state.lock();
        state.fresh.extend(batch);
        state.constructed = constructed;
        drop(state);
        shared.available.notify_all();

        tracing::trace!(constructed, capacity, "board pool batch ready");
    }

    tracing::info!(capacity, "board pool fully constructed");
}

// ============================================================================
// POOL ACCESS (Level 3)
// ============================================================================

/// A held critical section over the pool
pub struct PoolAccess<'a> {
    shared: &'a Shared,
    state: MutexGuard<'a, PoolState>,
}

impl PoolAccess<'_> {
    /// Take a snapshot
    ///
    /// The most recently released snapshot wins; otherwise the next
    /// never-used one. With every slot handed out this blocks, releasing the
    /// lock for one poll interval at a time, until another caller releases.
    /// There is no timeout. Snapshot contents are unspecified.
    pub fn acquire(&mut self) -> Board {
        let capacity = self.shared.config.capacity;
        let poll = self.shared.config.poll_interval;
        let mut warned = false;

        loop {
            if let Some(board) = self.state.freed.pop() {
                return board;
            }

            if self.state.handed_out < capacity {
                if let Some(board) = self.state.fresh.pop_front() {
                    self.state.handed_out += 1;
                    return board;
                }
                if self.shared.config.growth == Growth::OnDemand {
                    let batch = self.shared.build_batch(self.state.constructed);
                    self.state.constructed += batch.len();
                    self.state.fresh.extend(batch);
                    continue;
                }
            } else if !warned {
                tracing::warn!(capacity, "board pool exhausted, waiting for a release");
                warned = true;
            }

            self.shared.available.wait_for(&mut self.state, poll);
        }
    }

    /// Take a snapshot and copy `source` into it
    pub fn acquire_copy(&mut self, source: &Board) -> Board {
        let mut board = self.acquire();
        board.copy_from(source);
        board
    }

    /// Return a snapshot; it is the next one handed out
    pub fn release(&mut self, board: Board) {
        debug_assert!(board.slot() < self.shared.config.capacity);
        self.state.freed.push(board);
        self.shared.available.notify_one();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn on_demand(capacity: usize, batch: usize) -> BoardPool {
        BoardPool::new(
            PoolConfig::default()
                .with_capacity(capacity)
                .with_batch_size(batch)
                .with_growth(Growth::OnDemand),
        )
        .unwrap()
    }

    #[test]
    fn test_fresh_slots_in_order() {
        let pool = on_demand(100, 8);
        let slots: Vec<usize> = pool.access(|a| (0..20).map(|_| a.acquire().slot()).collect());
        assert_eq!(slots, (0..20).collect::<Vec<_>>());
        let stats = pool.stats();
        assert_eq!(stats.handed_out, 20);
        assert_eq!(stats.constructed, 24);
    }

    #[test]
    fn test_lifo_reuse() {
        let pool = on_demand(100, 10);
        let boards: Vec<Board> = pool.access(|a| (0..5).map(|_| a.acquire()).collect());
        let first: Vec<usize> = boards.iter().map(Board::slot).collect();

        pool.access(|a| {
            for board in boards {
                a.release(board);
            }
        });

        let again: Vec<Board> = pool.access(|a| (0..5).map(|_| a.acquire()).collect());
        let second: Vec<usize> = again.iter().map(Board::slot).collect();
        let mut expected = first.clone();
        expected.reverse();
        assert_eq!(second, expected);
    }

    #[test]
    fn test_release_preferred_over_fresh() {
        let pool = on_demand(100, 10);
        let a = pool.acquire();
        let b = pool.acquire();
        let slot_a = a.slot();
        pool.release(a);
        assert_eq!(pool.acquire().slot(), slot_a);
        assert_eq!(pool.acquire().slot(), b.slot() + 1);
    }

    #[test]
    fn test_stats_track_in_use() {
        let pool = on_demand(10, 4);
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.stats().in_use(), 2);
        pool.release(a);
        assert_eq!(pool.stats().in_use(), 1);
        pool.release(b);
        let stats = pool.stats();
        assert_eq!(stats.in_use(), 0);
        assert_eq!(stats.free, 2);
    }

    #[test]
    fn test_acquire_copy() {
        let pool = on_demand(10, 4);
        let mut source = pool.acquire();
        source.setup_standard();
        let copy = pool.acquire_copy(&source);
        assert_ne!(copy.slot(), source.slot());
        assert_eq!(copy.cells(), source.cells());
    }

    #[test]
    fn test_batches_never_exceed_capacity() {
        let pool = on_demand(5, 4);
        pool.wait_until_grown();
        assert_eq!(pool.stats().constructed, 5);
    }

    #[test]
    fn test_background_growth_reaches_capacity() {
        let pool = BoardPool::new(
            PoolConfig::default()
                .with_capacity(2500)
                .with_batch_size(1000)
                .with_poll_interval(Duration::from_millis(1)),
        )
        .unwrap();
        let first = pool.acquire();
        assert_eq!(first.slot(), 0);
        pool.wait_until_grown();
        assert_eq!(pool.stats().constructed, 2500);
    }

    #[test]
    fn test_exhausted_acquire_waits_for_release() {
        let pool = Arc::new(on_demand(2, 2));
        let held = pool.acquire();
        let other = pool.acquire();
        let held_slot = held.slot();

        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.acquire().slot())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        pool.release(held);

        assert_eq!(waiter.join().unwrap(), held_slot);
        pool.release(other);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert_eq!(
            BoardPool::new(PoolConfig::default().with_capacity(0)).unwrap_err(),
            ConfigError::ZeroCapacity
        );
        assert_eq!(
            BoardPool::new(PoolConfig::default().with_batch_size(0)).unwrap_err(),
            ConfigError::ZeroBatchSize
        );
    }
}
