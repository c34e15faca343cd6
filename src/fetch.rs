//! Caching Fetcher
//!
//! HTTP GET in front of a [`TtlCache`]: identical URLs within one cache
//! interval are served from memory instead of the network.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Where a fetched body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Upstream,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "hit",
            Source::Upstream => "miss",
        }
    }
}

// == Cached Fetcher ==
/// Fetches URLs through a shared TTL cache.
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    client: reqwest::Client,
    cache: Arc<TtlCache>,
}

impl CachedFetcher {
    pub fn new(client: reqwest::Client, cache: Arc<TtlCache>) -> Self {
        Self { client, cache }
    }

    /// Builds the HTTP client and cache from configuration.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let cache = TtlCache::new(config.interval())?;

        Ok(Self::new(client, Arc::new(cache)))
    }

    /// The cache backing this fetcher.
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    // == Get URL ==
    /// Returns the body at `url`, from the cache when possible.
    ///
    /// On a miss the body is downloaded and cached under the URL. Non-success
    /// responses are returned as errors and never cached.
    pub async fn get_url(&self, url: &str) -> Result<Bytes> {
        self.fetch(url).await.map(|(body, _)| body)
    }

    /// Like [`CachedFetcher::get_url`], also reporting whether the cache answered.
    pub async fn fetch(&self, url: &str) -> Result<(Bytes, Source)> {
        if url.is_empty() {
            return Err(CacheError::EmptyUrl);
        }

        if let Some(body) = self.cache.get(url).await {
            debug!(url, bytes = body.len(), "served from cache");
            return Ok((body, Source::Cache));
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::UpstreamStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        self.cache.add(url, body.clone()).await?;
        debug!(url, bytes = body.len(), "fetched and cached");

        Ok((body, Source::Upstream))
    }
}
