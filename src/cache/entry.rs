//! Cache Entry Module
//!
//! Defines a single cached value stamped with its insertion time.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

// == Cache Entry ==
/// A cached value plus the instant it was stored.
///
/// Entries are never mutated; re-adding a key replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored bytes
    pub value: Bytes,
    /// Insertion time
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // == Age ==
    /// Returns how long the entry has been stored as of `now`.
    ///
    /// Saturates to zero if `now` precedes the insertion time.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Stale ==
    /// Checks whether the entry is older than `ttl` at `now`.
    ///
    /// Boundary condition: an entry whose age is exactly `ttl` is still fresh.
    /// Only strictly older entries are eligible for sweeping.
    pub fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}
