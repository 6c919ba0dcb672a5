//! Cache Engine Module
//!
//! The thread-safe [`Cache`] handle. One `RwLock` guards the store (index and
//! recency list together) and the closed flag; the maintenance task shares the
//! same lock through an `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::store::{CacheStore, Miss, Probe, Reclaimed};
use crate::cache::{CacheMetrics, CacheStats};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_maintenance_task;

/// Everything behind the cache lock.
#[derive(Debug)]
pub(crate) struct CacheState {
    pub(crate) store: CacheStore,
    pub(crate) closed: bool,
}

/// State shared between the [`Cache`] handle and its maintenance task.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) state: RwLock<CacheState>,
    pub(crate) metrics: CacheMetrics,
}

impl Shared {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(CacheState {
                store: CacheStore::new(max_entries),
                closed: false,
            }),
            metrics: CacheMetrics::default(),
        }
    }

    /// Removes every expired entry under the write lock.
    pub(crate) async fn sweep_expired(&self, now: Instant) -> usize {
        let removed = self.state.write().await.store.remove_expired(now);
        self.metrics.record_expirations(removed);
        removed
    }

    fn record_reclaimed(&self, reclaimed: Reclaimed) {
        self.metrics.record_expirations(reclaimed.expired);
        self.metrics.record_evictions(reclaimed.evicted);
    }
}

// == Cache ==
/// In-process key-value cache with per-entry TTL and entry-count LRU eviction.
///
/// Values are copied on the way in and on the way out, so no caller can
/// observe or mutate the cache's internal buffers.
///
/// The cache owns its maintenance task. Call [`Cache::close`] to stop it and
/// wait for it to exit; dropping the cache only signals it to stop.
#[derive(Debug)]
pub struct Cache {
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Cache {
    // == Constructor ==
    /// Creates an open cache.
    ///
    /// Starts the maintenance task when `config.cleanup_interval` is non-zero,
    /// which requires a running tokio runtime, like [`tokio::spawn`].
    pub fn new(config: CacheConfig) -> Self {
        let shared = Arc::new(Shared::new(config.max_entries));
        let shutdown = CancellationToken::new();

        let worker = if config.has_cleanup() {
            Some(spawn_maintenance_task(
                Arc::clone(&shared),
                config.cleanup_interval,
                shutdown.clone(),
            ))
        } else {
            None
        };

        info!(
            "Cache created: max_entries={}, cleanup_interval={:?}",
            config.max_entries, config.cleanup_interval
        );

        Self {
            shared,
            shutdown,
            worker: Mutex::new(worker),
        }
    }

    // == Set ==
    /// Stores a copy of `value` under `key`.
    ///
    /// A zero `ttl` means the entry never expires. Overwriting a key replaces
    /// value and expiry together and promotes it to most recently used. When
    /// the cache is bounded, expired entries are reclaimed before any live
    /// entry is evicted.
    ///
    /// # Errors
    /// [`CacheError::Closed`] once the cache has been closed.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let reclaimed = {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Err(CacheError::Closed);
            }
            state.store.set(key, value, ttl, Instant::now())
        };

        if reclaimed != Reclaimed::default() {
            debug!(
                "Capacity enforcement after setting '{}': {} expired reclaimed, {} evicted",
                key, reclaimed.expired, reclaimed.evicted
            );
        }
        self.shared.record_reclaimed(reclaimed);
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the value stored under `key`.
    ///
    /// Missing, expired and evicted keys all come back as `None`. An expired
    /// entry found here is removed on the spot. A hit promotes the entry to
    /// most recently used.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();

        // Cheap check under the shared lock first
        let probe = self.shared.state.read().await.store.probe(key, now);
        if probe == Probe::Absent {
            self.shared.metrics.record_miss();
            return None;
        }

        // Promotion and removal need the exclusive lock. The entry may have
        // changed in between, so the store re-validates it.
        let result = self.shared.state.write().await.store.get(key, now);
        match result {
            Ok(value) => {
                self.shared.metrics.record_hit();
                Some(value)
            }
            Err(miss) => {
                if miss == Miss::Expired {
                    self.shared.metrics.record_expirations(1);
                }
                self.shared.metrics.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key` if present. Deleting a missing key is not an error.
    ///
    /// # Errors
    /// [`CacheError::Closed`] once the cache has been closed.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.shared.state.write().await;
        if state.closed {
            return Err(CacheError::Closed);
        }
        state.store.remove(key);
        Ok(())
    }

    // == Length ==
    /// Returns the number of stored entries.
    ///
    /// This includes entries that have expired but have not been reclaimed
    /// yet, so it can exceed the number of keys `get` would find.
    pub async fn len(&self) -> usize {
        self.shared.state.read().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.state.read().await.store.is_empty()
    }

    // == Keys ==
    /// Returns a snapshot of all keys from most to least recently used.
    /// Recency is not affected.
    pub async fn keys(&self) -> Vec<String> {
        self.shared.state.read().await.store.keys()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = self.len().await;
        self.shared.metrics.snapshot(total_entries)
    }

    pub async fn is_closed(&self) -> bool {
        self.shared.state.read().await.closed
    }

    // == Close ==
    /// Closes the cache and waits for the maintenance task to exit.
    ///
    /// Closing is one-way and idempotent: later calls return `Ok(())`
    /// immediately. After the first call, `set` and `delete` fail with
    /// [`CacheError::Closed`]; `get`, `len` and `keys` keep working on
    /// whatever entries remain.
    ///
    /// # Errors
    /// [`CacheError::Maintenance`] if the maintenance task panicked.
    pub async fn close(&self) -> Result<()> {
        {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return Ok(());
            }
            state.closed = true;
        }

        // Cancel outside the lock so a sweep in progress can finish
        self.shutdown.cancel();

        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            handle.await?;
        }

        info!("Cache closed");
        Ok(())
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn config(max_entries: usize, cleanup_ms: u64) -> CacheConfig {
        CacheConfig::new(max_entries, Duration::from_millis(cleanup_ms))
    }

    #[tokio::test]
    async fn test_new_without_cleanup_has_no_worker() {
        let cache = Cache::new(config(10, 0));
        assert!(cache.worker.lock().await.is_none());
        assert_ok!(cache.close().await);
    }

    #[tokio::test]
    async fn test_close_takes_worker_handle() {
        let cache = Cache::new(config(10, 10));
        assert!(cache.worker.lock().await.is_some());

        assert_ok!(cache.close().await);
        assert!(cache.worker.lock().await.is_none());
        assert!(cache.shutdown.is_cancelled());
        assert!(cache.is_closed().await);
    }

    #[tokio::test]
    async fn test_mutations_rejected_after_close() {
        let cache = Cache::new(config(10, 0));
        assert_ok!(cache.set("k", b"v", Duration::ZERO).await);
        assert_ok!(cache.close().await);

        assert!(matches!(
            cache.set("k2", b"v", Duration::ZERO).await,
            Err(CacheError::Closed)
        ));
        assert_err!(cache.delete("k").await);

        // Reads still see what was left behind
        assert_eq!(cache.get("k").await, Some(b"v".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_stats_track_hits_misses_and_reclaims() {
        let cache = Cache::new(config(1, 0));

        assert_ok!(cache.set("a", b"A", Duration::ZERO).await);
        assert!(cache.get("a").await.is_some());
        assert!(cache.get("missing").await.is_none());

        // Evicts "a"
        assert_ok!(cache.set("b", b"B", Duration::from_millis(5)).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Lazily expires "b"
        assert!(cache.get("b").await.is_none());

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
        assert_ok!(cache.close().await);
    }

    #[tokio::test]
    async fn test_drop_cancels_worker() {
        let cache = Cache::new(config(10, 10));
        let token = cache.shutdown.clone();
        drop(cache);
        assert!(token.is_cancelled());
    }
}
