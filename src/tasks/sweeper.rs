//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::{sweep_expired, EntryMap, StatsRecorder};

/// Spawns the sweeper for one cache instance.
///
/// The first tick fires one `interval` after this call, then every `interval`
/// after that. Each tick takes the write lock and removes entries older than
/// `interval`. The loop exits when `shutdown` is cancelled.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `entries` - Map shared with the owning cache
/// * `stats` - Counters shared with the owning cache
/// * `interval` - Tick period and TTL
/// * `shutdown` - Cancelled by `TtlCache::close` or on drop
pub fn spawn_sweeper(
    runtime: &Handle,
    entries: Arc<RwLock<EntryMap>>,
    stats: Arc<StatsRecorder>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let first_tick = Instant::now() + interval;

    runtime.spawn(async move {
        let mut ticker = interval_at(first_tick, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("Starting cache sweeper with interval of {:?}", interval);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("Cache sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let removed = {
                let mut guard = entries.write().await;
                sweep_expired(&mut guard, interval, Instant::now())
            };
            stats.record_sweep(removed);

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
