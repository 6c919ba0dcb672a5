//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry: its key, an owned copy of the value and
/// an optional expiry instant.
///
/// The key is kept alongside the value because eviction starts from the
/// recency list, not from the index.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is indexed under
    pub key: String,
    /// The stored value, copied from the caller's buffer
    pub value: Box<[u8]>,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry, copying `value`.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under
    /// * `value` - The bytes to store
    /// * `ttl` - Time to live; `Duration::ZERO` means the entry never expires
    /// * `now` - The instant the TTL is measured from
    pub fn new(key: String, value: &[u8], ttl: Duration, now: Instant) -> Self {
        Self {
            key,
            value: value.into(),
            expires_at: expiry_from(ttl, now),
        }
    }

    // == Overwrite ==
    /// Replaces value and expiry together.
    pub fn overwrite(&mut self, value: &[u8], ttl: Duration, now: Instant) {
        self.value = value.into();
        self.expires_at = expiry_from(ttl, now);
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Returns a fresh copy of the stored value.
    pub fn value_copy(&self) -> Vec<u8> {
        self.value.to_vec()
    }
}

/// Zero TTL means "no expiry". A TTL too large to represent as an instant is
/// treated the same way.
fn expiry_from(ttl: Duration, now: Instant) -> Option<Instant> {
    if ttl.is_zero() {
        None
    } else {
        now.checked_add(ttl)
    }
}
