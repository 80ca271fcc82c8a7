//! HEXGO Core - Board engine and move search
//!
//! This crate provides the core game logic for HEXGO:
//! - Board geometry (61-cell flower board in doubled offset coordinates)
//! - Board snapshots, clone/jump moves and conversion
//! - A capacity-bounded pool of reusable board snapshots
//! - Bounded best-first search with top-level parallel expansion

pub mod board;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pool;
pub mod search;

// Re-exports for convenient access
pub use board::{Board, Cell, Move, MoveKind, Player};
pub use config::{Growth, PoolConfig, SearchConfig};
pub use error::{ConfigError, HexgoError, ParseMoveError};
pub use geometry::{geometry, Geometry, Position, CELL_COUNT};
pub use pool::{BoardPool, PoolAccess, PoolStats};
pub use search::{Searcher, Trial};
