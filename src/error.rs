//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;
use tokio::task::JoinError;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Lookups never fail: a missing, expired or evicted key is simply `None`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache was closed; it will never accept mutations again
    #[error("cache is closed")]
    Closed,

    /// The maintenance task did not exit cleanly
    #[error("maintenance task failed: {0}")]
    Maintenance(#[from] JoinError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
