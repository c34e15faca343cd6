//! Pokecache - An in-memory TTL cache for HTTP responses
//!
//! Stores response bodies keyed by request URL and evicts them with a
//! background sweeper once they are older than the cache interval.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod tasks;

pub use cache::TtlCache;
pub use config::Config;
pub use error::{CacheError, Result};
pub use fetch::CachedFetcher;
