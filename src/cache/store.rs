//! Cache Store Module
//!
//! The TTL cache: a HashMap behind a read/write lock, swept by a background task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, StatsRecorder};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweeper;

/// Key-to-entry storage shared between the cache handle and its sweeper.
pub type EntryMap = HashMap<String, CacheEntry>;

// == TTL Cache ==
/// Concurrency-safe key-value store whose entries expire after a fixed interval.
///
/// Expiry is enforced only by the sweeper, which wakes every `interval` and
/// removes entries older than `interval`. An entry that is past its TTL but
/// has not been swept yet is still returned by [`TtlCache::get`].
///
/// Dropping the cache cancels the sweeper.
#[derive(Debug)]
pub struct TtlCache {
    /// Key-value storage
    entries: Arc<RwLock<EntryMap>>,
    /// Hit/miss/sweep counters
    stats: Arc<StatsRecorder>,
    /// TTL and sweep period
    interval: Duration,
    /// Stops the sweeper
    shutdown: CancellationToken,
    /// Sweeper task, taken by `shutdown`
    sweeper: Option<JoinHandle<()>>,
}

impl TtlCache {
    // == Constructor ==
    /// Creates an empty cache and starts its sweeper.
    ///
    /// # Errors
    /// - `InvalidArgument` if `interval` is zero or overflows the clock
    /// - `NoRuntime` if called outside a Tokio runtime
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(CacheError::InvalidArgument(
                "cache interval must be positive".to_string(),
            ));
        }
        if Instant::now().checked_add(interval).is_none() {
            return Err(CacheError::InvalidArgument(format!(
                "cache interval {:?} is too large",
                interval
            )));
        }

        let runtime =
            Handle::try_current().map_err(|err| CacheError::NoRuntime(err.to_string()))?;

        let entries = Arc::new(RwLock::new(EntryMap::new()));
        let stats = Arc::new(StatsRecorder::new());
        let shutdown = CancellationToken::new();

        let sweeper = spawn_sweeper(
            &runtime,
            Arc::clone(&entries),
            Arc::clone(&stats),
            interval,
            shutdown.clone(),
        );

        Ok(Self {
            entries,
            stats,
            interval,
            shutdown,
            sweeper: Some(sweeper),
        })
    }

    // == Add ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Overwriting a key resets its TTL clock. Empty keys and values are allowed.
    pub async fn add(&self, key: impl Into<String>, value: impl Into<Bytes>) -> Result<()> {
        let key = key.into();
        let entry = CacheEntry::new(value.into());

        let mut entries = self.entries.write().await;
        trace!(key = %key, bytes = entry.value.len(), "cache add");
        entries.insert(key, entry);

        Ok(())
    }

    // == Get ==
    /// Looks up `key`, returning the stored bytes if present.
    ///
    /// Takes only the shared lock; concurrent lookups do not block each other.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let value = {
            let entries = self.entries.read().await;
            entries.get(key).map(|entry| entry.value.clone())
        };

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Close ==
    /// Stops the sweeper. Idempotent.
    ///
    /// The cache stays usable afterwards, but nothing expires anymore.
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            debug!("closing TTL cache");
            self.shutdown.cancel();
        }
    }

    /// Returns true once [`TtlCache::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Closes the cache and waits for the sweeper to exit.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(handle) = self.sweeper.take() {
            if let Err(err) = handle.await {
                debug!("sweeper task ended abnormally: {}", err);
            }
        }
    }

    /// Returns true while the sweeper task is alive.
    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    // == Accessors ==
    /// The TTL, which is also the sweep period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the current number of entries, swept or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = self.len().await;
        self.stats.snapshot(total_entries)
    }
}

impl Drop for TtlCache {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// == Sweep Expired ==
/// Removes every entry older than `ttl` as of `now`.
///
/// Returns the number of entries removed.
pub fn sweep_expired(entries: &mut EntryMap, ttl: Duration, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|key, entry| {
        let stale = entry.is_stale(now, ttl);
        if stale {
            trace!(key = %key, "evicting cache entry");
        }
        !stale
    });
    before - entries.len()
}
