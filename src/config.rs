//! Configuration Module
//!
//! Capacity and maintenance settings for a [`Cache`](crate::Cache).

use std::env;
use std::time::Duration;

/// Default maximum number of entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default interval between background expiry sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Cache configuration parameters.
///
/// A value of zero switches the corresponding mechanism off:
/// - `max_entries == 0` means the cache is unbounded (no LRU eviction)
/// - `cleanup_interval == Duration::ZERO` disables background sweeps; expired
///   entries are then only reclaimed lazily on `get` and under capacity pressure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Interval between background expiry sweeps
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with explicit values.
    pub fn new(max_entries: usize, cleanup_interval: Duration) -> Self {
        Self {
            max_entries,
            cleanup_interval,
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries, `<= 0` for unbounded (default: 1000)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep interval in milliseconds, `<= 0` to disable (default: 1000)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .map(|n| usize::try_from(n).unwrap_or(0))
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .map(|ms| Duration::from_millis(u64::try_from(ms).unwrap_or(0)))
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL),
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_cleanup_interval(mut self, cleanup_interval: Duration) -> Self {
        self.cleanup_interval = cleanup_interval;
        self
    }

    /// Returns true if the background maintenance task should run.
    pub fn has_cleanup(&self) -> bool {
        !self.cleanup_interval.is_zero()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}
