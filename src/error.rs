//! Error types for the cache and the caching fetcher
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Rejected constructor argument (e.g. a zero sweep interval)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The sweeper could not be spawned because no Tokio runtime is running
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(String),

    /// Fetch requested with an empty URL
    #[error("No URL provided")]
    EmptyUrl,

    /// Transport or body error from the HTTP client
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status} for {url}")]
    UpstreamStatus {
        url: String,
        status: reqwest::StatusCode,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
