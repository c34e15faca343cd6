//! Configuration Module
//!
//! Handles loading the cache and fetcher settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_INTERVAL_SECS;

/// Base URL relative request paths are resolved against
pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Upstream request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL and sweep period in seconds
    pub cache_interval: u64,
    /// Base URL for relative request paths
    pub api_base_url: String,
    /// Upstream request timeout in seconds
    pub request_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_INTERVAL` - Cache TTL in seconds (default: 15)
    /// - `API_BASE_URL` - Base URL for relative paths (default: https://pokeapi.co/api/v2/)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 10)
    ///
    /// Unparsable or zero durations fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            cache_interval: positive_var("CACHE_INTERVAL").unwrap_or(DEFAULT_INTERVAL_SECS),
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout: positive_var("REQUEST_TIMEOUT")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Cache interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.cache_interval)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Resolves `target` against the base URL unless it is already absolute.
    pub fn resolve_url(&self, target: &str) -> String {
        let target = target.trim();
        if target.starts_with("http://") || target.starts_with("https://") {
            return target.to_string();
        }

        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_interval: DEFAULT_INTERVAL_SECS,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

fn positive_var<T>(name: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > T::default())
}
