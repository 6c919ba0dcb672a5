//! Cache Store Module
//!
//! Unsynchronized cache core: a HashMap index from key to a node in the
//! recency list, plus the TTL and capacity policies. Every method assumes the
//! caller holds the appropriate side of the engine's lock; the index and the
//! list are only ever changed together.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::lru::{NodeId, RecencyList};
use crate::cache::CacheEntry;

/// Result of a read-only lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Absent,
    Expired,
    Live,
}

/// Why a confirmed read found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    Absent,
    /// The entry was expired and has been removed
    Expired,
}

/// Entries reclaimed by a capacity-enforcement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reclaimed {
    pub expired: usize,
    pub evicted: usize,
}

// == Cache Store ==
/// Cache storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key to node lookup
    index: HashMap<String, NodeId>,
    /// Entries ordered MRU (front) to LRU (back)
    lru: RecencyList<CacheEntry>,
    /// Maximum number of entries allowed, 0 = unbounded
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries, or 0 for no limit
    pub fn new(max_entries: usize) -> Self {
        Self {
            index: HashMap::new(),
            lru: RecencyList::new(),
            max_entries,
        }
    }

    // == Set ==
    /// Stores a copy of `value` under `key` and promotes it to MRU.
    ///
    /// If the key already exists, value and TTL are overwritten together.
    /// Capacity is enforced afterwards.
    pub fn set(&mut self, key: &str, value: &[u8], ttl: Duration, now: Instant) -> Reclaimed {
        match self.index.get(key).copied() {
            Some(id) => {
                if let Some(entry) = self.lru.get_mut(id) {
                    entry.overwrite(value, ttl, now);
                }
                self.lru.move_to_front(id);
            }
            None => {
                let id = self
                    .lru
                    .push_front(CacheEntry::new(key.to_string(), value, ttl, now));
                self.index.insert(key.to_string(), id);
            }
        }

        self.enforce_capacity(now)
    }

    // == Probe ==
    /// Checks existence and expiry without touching recency.
    pub fn probe(&self, key: &str, now: Instant) -> Probe {
        match self.index.get(key).and_then(|id| self.lru.get(*id)) {
            None => Probe::Absent,
            Some(entry) if entry.is_expired_at(now) => Probe::Expired,
            Some(_) => Probe::Live,
        }
    }

    // == Get ==
    /// Retrieves a copy of the value and promotes the entry to MRU.
    ///
    /// An expired entry is removed (lazy expiration) and reported as a miss.
    pub fn get(&mut self, key: &str, now: Instant) -> Result<Vec<u8>, Miss> {
        let id = *self.index.get(key).ok_or(Miss::Absent)?;
        let expired = match self.lru.get(id) {
            Some(entry) => entry.is_expired_at(now),
            None => return Err(Miss::Absent),
        };

        if expired {
            self.remove(key);
            return Err(Miss::Expired);
        }

        self.lru.move_to_front(id);
        self.lru
            .get(id)
            .map(CacheEntry::value_copy)
            .ok_or(Miss::Absent)
    }

    // == Remove ==
    /// Removes an entry by key. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.lru.remove(id);
                true
            }
            None => false,
        }
    }

    // == Remove Expired ==
    /// Removes every entry whose expiry is at or before `now`.
    ///
    /// This is a full O(n) scan. Returns the number of entries removed.
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<NodeId> = self
            .lru
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(id, _)| id)
            .collect();

        for id in &expired {
            if let Some(entry) = self.lru.remove(*id) {
                self.index.remove(&entry.key);
            }
        }
        expired.len()
    }

    // == Enforce Capacity ==
    /// Brings the store back within `max_entries`.
    ///
    /// Expired entries are reclaimed first, regardless of recency, so dead
    /// data never displaces live data. Only then are live entries evicted from
    /// the LRU end, one at a time.
    pub fn enforce_capacity(&mut self, now: Instant) -> Reclaimed {
        let mut reclaimed = Reclaimed::default();
        if self.max_entries == 0 {
            return reclaimed;
        }

        reclaimed.expired = self.remove_expired(now);

        while self.index.len() > self.max_entries {
            match self.lru.pop_back() {
                Some(entry) => {
                    self.index.remove(&entry.key);
                    reclaimed.evicted += 1;
                }
                None => break,
            }
        }
        reclaimed
    }

    // == Keys ==
    /// Returns all keys from MRU to LRU.
    pub fn keys(&self) -> Vec<String> {
        self.lru.iter().map(|(_, entry)| entry.key.clone()).collect()
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Checks that the index and the recency list describe the same keys.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.index.len() == self.lru.len()
            && self
                .lru
                .iter()
                .all(|(id, entry)| self.index.get(&entry.key) == Some(&id))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NO_TTL: Duration = Duration::ZERO;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();

        store.set("key1", b"value1", NO_TTL, now);
        assert_eq!(store.get("key1", now), Ok(b"value1".to_vec()));
        assert_eq!(store.len(), 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(100);
        assert_eq!(store.get("nonexistent", Instant::now()), Err(Miss::Absent));
    }

    #[test]
    fn test_store_remove() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();

        store.set("key1", b"value1", NO_TTL, now);
        assert!(store.remove("key1"));
        assert!(!store.remove("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1", now), Err(Miss::Absent));
        assert!(store.is_consistent());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();

        store.set("key1", b"value1", ms(10), now);
        store.set("key1", b"value2", NO_TTL, now);

        // The new TTL replaced the old one along with the value
        assert_eq!(store.get("key1", now + ms(50)), Ok(b"value2".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_promotes_to_mru() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();

        store.set("a", b"A", NO_TTL, now);
        store.set("b", b"B", NO_TTL, now);
        store.set("a", b"A2", NO_TTL, now);

        assert_eq!(store.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_probe() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();
        store.set("k", b"v", ms(30), now);

        assert_eq!(store.probe("k", now), Probe::Live);
        assert_eq!(store.probe("k", now + ms(30)), Probe::Expired);
        assert_eq!(store.probe("missing", now), Probe::Absent);
        // Probing never removes
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_lazy_expiration() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();

        store.set("key1", b"value1", ms(30), now);
        assert!(store.get("key1", now + ms(10)).is_ok());

        assert_eq!(store.get("key1", now + ms(80)), Err(Miss::Expired));
        assert_eq!(store.len(), 0);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(3);
        let now = Instant::now();

        store.set("key1", b"value1", NO_TTL, now);
        store.set("key2", b"value2", NO_TTL, now);
        store.set("key3", b"value3", NO_TTL, now);

        // Cache is full, adding key4 should evict key1 (oldest)
        let reclaimed = store.set("key4", b"value4", NO_TTL, now);
        assert_eq!(reclaimed, Reclaimed { expired: 0, evicted: 1 });

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1", now), Err(Miss::Absent));
        assert!(store.get("key2", now).is_ok());
        assert!(store.get("key3", now).is_ok());
        assert!(store.get("key4", now).is_ok());
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = CacheStore::new(2);
        let now = Instant::now();

        store.set("a", b"A", NO_TTL, now);
        store.set("b", b"B", NO_TTL, now);
        store.get("a", now).unwrap();
        store.set("c", b"C", NO_TTL, now);

        assert_eq!(store.get("b", now), Err(Miss::Absent));
        assert!(store.get("a", now).is_ok());
        assert!(store.get("c", now).is_ok());
    }

    #[test]
    fn test_expired_reclaimed_before_live_eviction() {
        let mut store = CacheStore::new(2);
        let now = Instant::now();

        store.set("live", b"L", NO_TTL, now);
        // More recently used than "live", but dead by the time "new" arrives
        store.set("dead", b"D", ms(20), now);

        let reclaimed = store.set("new", b"N", NO_TTL, now + ms(40));
        assert_eq!(reclaimed, Reclaimed { expired: 1, evicted: 0 });
        assert_eq!(store.keys(), vec!["new", "live"]);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_capacity_sweep_reclaims_all_expired() {
        let mut store = CacheStore::new(3);
        let now = Instant::now();

        store.set("e1", b"x", ms(5), now);
        store.set("keep", b"x", NO_TTL, now);
        store.set("e2", b"x", ms(5), now);

        let reclaimed = store.set("new", b"x", NO_TTL, now + ms(10));
        assert_eq!(reclaimed.expired, 2);
        assert_eq!(reclaimed.evicted, 0);
        assert_eq!(store.keys(), vec!["new", "keep"]);
    }

    #[test]
    fn test_unbounded_store_never_evicts_or_sweeps() {
        let mut store = CacheStore::new(0);
        let now = Instant::now();

        store.set("old", b"x", ms(1), now);
        for i in 0..100 {
            let reclaimed = store.set(&format!("k{i}"), b"x", NO_TTL, now + ms(10));
            assert_eq!(reclaimed, Reclaimed::default());
        }
        // Expired entry still counted until something reclaims it
        assert_eq!(store.len(), 101);
    }

    #[test]
    fn test_store_remove_expired() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();

        store.set("key1", b"value1", ms(1000), now);
        store.set("key2", b"value2", ms(10_000), now);
        store.set("key3", b"value3", NO_TTL, now);

        assert_eq!(store.remove_expired(now + ms(1100)), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys(), vec!["key3", "key2"]);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_len_counts_unreclaimed_expired() {
        let mut store = CacheStore::new(100);
        let now = Instant::now();

        store.set("k", b"v", ms(10), now);
        let later = now + ms(20);

        assert_eq!(store.probe("k", later), Probe::Expired);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k", later), Err(Miss::Expired));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_keys_do_not_change_recency() {
        let mut store = CacheStore::new(2);
        let now = Instant::now();

        store.set("a", b"A", NO_TTL, now);
        store.set("b", b"B", NO_TTL, now);
        assert_eq!(store.keys(), vec!["b", "a"]);
        assert_eq!(store.keys(), vec!["b", "a"]);

        store.set("c", b"C", NO_TTL, now);
        assert_eq!(store.keys(), vec!["c", "b"]);
    }
}
