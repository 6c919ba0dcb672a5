//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod engine;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use engine::Cache;
pub use entry::CacheEntry;
pub use lru::{NodeId, RecencyList};
pub use stats::{CacheMetrics, CacheStats};
pub use store::{CacheStore, Miss, Probe, Reclaimed};

pub(crate) use engine::Shared;
