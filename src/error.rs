//! Error types for the cache
//!
//! `add` and `get` cannot fail; only lifecycle and construction do.

use thiserror::Error;
use tokio::task::JoinError;

// == Cache Error Enum ==
/// Unified error type for cache construction and reaper lifecycle.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Expiry interval must be non-zero and at most one year
    #[error("Invalid interval: expiry interval must be greater than zero and at most 365 days")]
    InvalidInterval,

    /// `start` was called while a reaper task is still running
    #[error("Reaper already running")]
    ReaperAlreadyRunning,

    /// `start` was called outside of a tokio runtime
    #[error("No tokio runtime available to spawn the reaper")]
    NoRuntime,

    /// The reaper task panicked or was cancelled before it could be joined
    #[error("Reaper task failed: {0}")]
    ReaperFailed(#[from] JoinError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
