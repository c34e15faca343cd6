//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Sweeper: Removes entries older than the cache interval, once per interval

mod sweeper;

pub use sweeper::spawn_sweeper;
