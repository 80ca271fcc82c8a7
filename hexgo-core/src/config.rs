//! Configuration types for the board pool and the search

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the pool builds its snapshots
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Growth {
    /// A grower thread builds batches until capacity is reached
    #[default]
    Background,
    /// The next batch is built inline when an acquire finds none left
    OnDemand,
}

/// Board pool configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of snapshots ever constructed
    pub capacity: usize,
    /// Snapshots constructed per growth step
    pub batch_size: usize,
    /// How long an exhausted acquire sleeps between checks
    pub poll_interval: Duration,
    pub growth: Growth,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 2_500_000,
            batch_size: 1000,
            poll_interval: Duration::from_millis(200),
            growth: Growth::Background,
        }
    }
}

impl PoolConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}

/// Search configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Plies explored below the immediate moves
    pub depth: u32,
    /// Best-scoring candidates expanded per node
    pub branching: usize,
    /// Expand the top-level candidates on a worker pool
    pub parallel: bool,
    /// Worker count (None = one per core)
    pub threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 6,
            branching: 10,
            parallel: true,
            threads: None,
        }
    }
}

impl SearchConfig {
    /// Sequential search at the given depth
    pub fn sequential(depth: u32) -> Self {
        Self {
            depth,
            parallel: false,
            ..Default::default()
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.branching == 0 {
            return Err(ConfigError::ZeroBranching);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pool = PoolConfig::default();
        assert_eq!(pool.capacity, 2_500_000);
        assert_eq!(pool.batch_size, 1000);
        assert_eq!(pool.poll_interval, Duration::from_millis(200));

        let search = SearchConfig::default();
        assert_eq!(search.depth, 6);
        assert_eq!(search.branching, 10);
        assert!(search.parallel);
    }

    #[test]
    fn test_validation() {
        assert!(PoolConfig::default().validate().is_ok());
        assert_eq!(
            SearchConfig::default().with_branching(0).validate(),
            Err(ConfigError::ZeroBranching)
        );
        assert_eq!(
            SearchConfig::default().with_threads(0).validate(),
            Err(ConfigError::ZeroThreads)
        );
    }
}
