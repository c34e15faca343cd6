//! Pokecache - An in-memory TTL cache for HTTP responses
//!
//! Reads one URL or API path per line from stdin and fetches each through the
//! cache, reporting whether the body came from memory or the network.

use std::io::BufRead;

use anyhow::Context;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokecache::fetch::CachedFetcher;
use pokecache::Config;

/// Main entry point for the caching fetcher.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the HTTP client and cache (starts the sweeper)
/// 4. Fetch each stdin line through the cache until EOF or Ctrl+C
/// 5. Close the cache and print final statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_interval={}s, api_base_url={}, request_timeout={}s",
        config.cache_interval, config.api_base_url, config.request_timeout
    );

    let fetcher =
        CachedFetcher::from_config(&config).context("failed to initialize the fetcher")?;
    info!("Cache initialized, reading requests from stdin");

    tokio::select! {
        result = run(&fetcher, &config) => result?,
        _ = shutdown_signal() => info!("Received Ctrl+C, shutting down..."),
    }

    fetcher.cache().close();
    let stats = fetcher.cache().stats().await;
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("failed to serialize cache stats")?
    );

    Ok(())
}

/// Fetches every non-empty stdin line through the cache.
///
/// Fetch failures are reported and skipped; only stdin errors end the loop.
async fn run(fetcher: &CachedFetcher, config: &Config) -> anyhow::Result<()> {
    let mut lines = spawn_stdin_reader();

    while let Some(line) = lines.recv().await {
        let line = line.context("failed to read stdin")?;
        let target = line.trim();
        if target.is_empty() {
            continue;
        }

        let url = config.resolve_url(target);
        match fetcher.fetch(&url).await {
            Ok((body, source)) => println!("{}: {} bytes ({})", url, body.len(), source.as_str()),
            Err(err) => warn!("{}", err),
        }
    }

    Ok(())
}

/// Reads stdin lines on a plain thread, outside the runtime.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", err);
        std::future::pending::<()>().await;
    }
}
