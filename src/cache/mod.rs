//! Cache Module
//!
//! Provides an in-memory key-value cache whose entries expire after a fixed interval.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsRecorder};
pub use store::{sweep_expired, EntryMap, TtlCache};

// == Public Constants ==
/// Interval used when none is configured
pub const DEFAULT_INTERVAL_SECS: u64 = 15;
