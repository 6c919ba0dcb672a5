//! Mini Cache - An in-process key-value cache
//!
//! Bounds memory with an entry-count LRU policy and supports per-entry TTL
//! expiration, reclaimed both lazily on access and by an optional background
//! maintenance task.

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
