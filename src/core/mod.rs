//! Core business logic abstractions

pub mod backtest;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod link;
pub mod log;
pub mod profile;
pub mod snapshot;

// Re-export main types for cleaner imports
pub use backtest::{BacktestApi, BacktestRequest, BacktestResult};
pub use error::ClientError;
pub use link::{LinkApi, LinkController, LinkSession, LinkStatus};
pub use profile::{DataProfile, DatasetApi};
pub use snapshot::{NetWorthRefresher, SnapshotApi, TransactionRefresher};
