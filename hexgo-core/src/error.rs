//! Error types

/// Failure to parse a `fromRow,fromCol,toRow,toCol` move command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMoveError {
    #[error("expected 4 comma-separated fields, found {0}")]
    FieldCount(usize),

    #[error("invalid coordinate {field:?}: {source}")]
    Coordinate {
        field: String,
        source: std::num::ParseIntError,
    },
}

/// Invalid pool or search configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("pool capacity must be at least 1")]
    ZeroCapacity,

    #[error("pool batch size must be at least 1")]
    ZeroBatchSize,

    #[error("search branching cap must be at least 1")]
    ZeroBranching,

    #[error("worker thread count must be at least 1")]
    ZeroThreads,
}

/// Crate-level error
#[derive(Debug, thiserror::Error)]
pub enum HexgoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ParseMove(#[from] ParseMoveError),

    #[error("failed to start search workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),
}
