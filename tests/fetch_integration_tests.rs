//! Integration Tests for the Caching Fetcher
//!
//! Runs the fetcher against a local axum server standing in for the upstream API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use bytes::Bytes;
use pokecache::fetch::{CachedFetcher, Source};
use pokecache::{CacheError, Config, TtlCache};

const LOCATION_AREAS: &str =
    r#"{"count":1,"next":null,"previous":null,"results":[{"name":"canalave-city-area","url":""}]}"#;

// == Helper Functions ==

/// Starts the fake upstream and returns its base URL and request counter.
async fn spawn_upstream() -> (String, Arc<AtomicUsize>) {
    let requests = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route(
            "/location-area/",
            get(|State(requests): State<Arc<AtomicUsize>>| async move {
                requests.fetch_add(1, Ordering::SeqCst);
                LOCATION_AREAS
            }),
        )
        .route(
            "/pokemon/missingno/",
            get(|State(requests): State<Arc<AtomicUsize>>| async move {
                requests.fetch_add(1, Ordering::SeqCst);
                (StatusCode::NOT_FOUND, "Not Found")
            }),
        )
        .with_state(requests.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), requests)
}

fn fetcher_with_interval(interval: Duration) -> CachedFetcher {
    let cache = TtlCache::new(interval).unwrap();
    CachedFetcher::new(reqwest::Client::new(), Arc::new(cache))
}

// == Cache Hits ==

#[tokio::test]
async fn test_second_fetch_served_from_cache() {
    let (base, requests) = spawn_upstream().await;
    let fetcher = fetcher_with_interval(Duration::from_secs(15));
    let url = format!("{}/location-area/", base);

    let (body, source) = fetcher.fetch(&url).await.unwrap();
    assert_eq!(body, Bytes::from_static(LOCATION_AREAS.as_bytes()));
    assert_eq!(source, Source::Upstream);

    let (body, source) = fetcher.fetch(&url).await.unwrap();
    assert_eq!(body, Bytes::from_static(LOCATION_AREAS.as_bytes()));
    assert_eq!(source, Source::Cache);

    assert_eq!(requests.load(Ordering::SeqCst), 1);

    let stats = fetcher.cache().stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.total_entries, 1);
}

#[tokio::test]
async fn test_refetch_after_expiry() {
    let (base, requests) = spawn_upstream().await;
    let fetcher = fetcher_with_interval(Duration::from_millis(100));
    let url = format!("{}/location-area/", base);

    fetcher.get_url(&url).await.unwrap();
    fetcher.get_url(&url).await.unwrap();
    assert_eq!(requests.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(350)).await;

    let (_, source) = fetcher.fetch(&url).await.unwrap();
    assert_eq!(source, Source::Upstream);
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

// == Errors ==

#[tokio::test]
async fn test_error_status_not_cached() {
    let (base, requests) = spawn_upstream().await;
    let fetcher = fetcher_with_interval(Duration::from_secs(15));
    let url = format!("{}/pokemon/missingno/", base);

    for _ in 0..2 {
        let err = fetcher.get_url(&url).await.unwrap_err();
        match err {
            CacheError::UpstreamStatus { url: failed, status } => {
                assert_eq!(failed, url);
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(requests.load(Ordering::SeqCst), 2);
    assert!(fetcher.cache().is_empty().await);
}

#[tokio::test]
async fn test_empty_url() {
    let fetcher = fetcher_with_interval(Duration::from_secs(15));
    assert!(matches!(fetcher.get_url("").await, Err(CacheError::EmptyUrl)));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = fetcher_with_interval(Duration::from_secs(15));
    let result = fetcher.get_url(&format!("http://{}/location-area/", addr)).await;

    assert!(matches!(result, Err(CacheError::Http(_))));
    assert!(fetcher.cache().is_empty().await);
}

// == Configuration ==

#[tokio::test]
async fn test_from_config_resolves_paths() {
    let (base, requests) = spawn_upstream().await;
    let config = Config {
        api_base_url: base,
        ..Config::default()
    };
    let fetcher = CachedFetcher::from_config(&config).unwrap();

    let url = config.resolve_url("location-area/");
    fetcher.get_url(&url).await.unwrap();
    fetcher.get_url(&url).await.unwrap();

    assert_eq!(requests.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.cache().interval(), Duration::from_secs(15));
}
