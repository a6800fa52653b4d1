//! Integration Tests for the Cache
//!
//! Exercises the public handle the way a fetching client uses it: look up by
//! URL, fill on miss, and rely on the reaper to age entries out.

use std::sync::{Arc, Once};
use std::time::Duration;

use pokecache::{Cache, CacheError, Config, ReadPolicy};
use serde_json::Value;
use tokio::time::sleep;

// == Helper Functions ==

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "pokecache=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

const LOCATIONS_URL: &str = "https://pokeapi.co/api/v2/location-area/?offset=0&limit=20";

fn location_page_body() -> Vec<u8> {
    br#"{"count":1089,"next":"https://pokeapi.co/api/v2/location-area/?offset=20&limit=20","previous":null,"results":[{"name":"canalave-city-area","url":"https://pokeapi.co/api/v2/location-area/1/"}]}"#
        .to_vec()
}

/// Stand-in for the network call: returns the body and counts invocations.
async fn fetch_through(cache: &Cache, url: &str, fetches: &mut usize) -> Value {
    let body = match cache.get(url).await {
        Some(body) => body,
        None => {
            *fetches += 1;
            let body = location_page_body();
            cache.add(url, body.clone()).await;
            body
        }
    };
    serde_json::from_slice(&body).unwrap()
}

// == Basic Contract ==

#[tokio::test]
async fn test_add_then_get_roundtrip() {
    init_tracing();
    let cache = Cache::spawn(Duration::from_secs(300)).unwrap();

    cache.add("testKey", "testValue").await;

    assert_eq!(cache.get("testKey").await, Some(b"testValue".to_vec()));
    cache.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_key_misses() {
    let cache = Cache::new(Duration::from_secs(300)).unwrap();

    assert_eq!(cache.get("never-added").await, None);
    assert_eq!(cache.get("").await, None);
}

#[tokio::test]
async fn test_overwrite_returns_latest() {
    let cache = Cache::new(Duration::from_secs(300)).unwrap();

    cache.add("k", "v1").await;
    cache.add("k", "v2").await;

    assert_eq!(cache.get("k").await, Some(b"v2".to_vec()));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_returned_bytes_are_independent() {
    let cache = Cache::new(Duration::from_secs(300)).unwrap();
    cache.add("k", "hello").await;

    let mut first = cache.get("k").await.unwrap();
    first.clear();

    assert_eq!(cache.get("k").await, Some(b"hello".to_vec()));
}

// == Expiry ==

#[tokio::test]
async fn test_entry_expires_after_interval_and_sweep() {
    init_tracing();
    let interval = Duration::from_millis(10);
    let cache = Cache::spawn(interval).unwrap();

    cache.add("a", "hello").await;

    sleep(Duration::from_millis(5)).await;
    assert_eq!(cache.get("a").await, Some(b"hello".to_vec()));

    // Several reaper periods; the entry is stale from the second sweep on
    sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get("a").await, None);
    assert!(cache.is_empty().await);

    cache.close().await.unwrap();
}

#[tokio::test]
async fn test_refreshed_entry_survives_sweep() {
    let interval = Duration::from_millis(100);
    let cache = Cache::spawn(interval).unwrap();

    cache.add("k", "v1").await;
    sleep(Duration::from_millis(70)).await;
    cache.add("k", "v2").await;

    // First sweep at 100ms sees an entry that is only 30ms old
    sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get("k").await, Some(b"v2".to_vec()));

    cache.close().await.unwrap();
}

#[tokio::test]
async fn test_lenient_reads_see_unswept_entries() {
    // Reaper not started, so nothing is ever swept
    let cache = Cache::new(Duration::from_millis(10)).unwrap();
    cache.add("k", "v").await;

    sleep(Duration::from_millis(40)).await;

    assert_eq!(cache.get("k").await, Some(b"v".to_vec()));
}

#[tokio::test]
async fn test_strict_reads_hide_unswept_entries() {
    let cache = Cache::with_policy(Duration::from_millis(10), ReadPolicy::Strict).unwrap();
    cache.add("k", "v").await;
    assert_eq!(cache.get("k").await, Some(b"v".to_vec()));

    sleep(Duration::from_millis(40)).await;

    assert_eq!(cache.get("k").await, None);
    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.reap().await, 1);
}

#[tokio::test]
async fn test_closed_cache_stops_expiring() {
    let interval = Duration::from_millis(10);
    let cache = Cache::spawn(interval).unwrap();
    cache.close().await.unwrap();

    cache.add("k", "v").await;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(cache.stats().await.sweeps, 0);
    assert_eq!(cache.get("k").await, Some(b"v".to_vec()));
}

// == Fetch-Through Usage ==

#[tokio::test]
async fn test_fetch_through_serves_second_request_from_cache() {
    init_tracing();
    let config = Config {
        interval: Duration::from_secs(60),
        ..Config::default()
    };
    let cache = Cache::from_config(&config).unwrap();
    cache.start().unwrap();
    let mut fetches = 0;

    let first = fetch_through(&cache, LOCATIONS_URL, &mut fetches).await;
    let second = fetch_through(&cache, LOCATIONS_URL, &mut fetches).await;

    assert_eq!(fetches, 1);
    assert_eq!(first, second);
    assert_eq!(second["results"][0]["name"], "canalave-city-area");
    assert_eq!(cache.get(LOCATIONS_URL).await, Some(location_page_body()));

    let stats = cache.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);

    cache.close().await.unwrap();
}

#[tokio::test]
async fn test_fetch_through_refetches_after_expiry() {
    let cache = Cache::spawn(Duration::from_millis(20)).unwrap();
    let mut fetches = 0;

    fetch_through(&cache, LOCATIONS_URL, &mut fetches).await;
    sleep(Duration::from_millis(80)).await;
    fetch_through(&cache, LOCATIONS_URL, &mut fetches).await;

    assert_eq!(fetches, 2);
    cache.close().await.unwrap();
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_and_get() {
    init_tracing();
    let cache = Arc::new(Cache::spawn(Duration::from_millis(5)).unwrap());
    let mut handles = Vec::new();

    for worker in 0..8u8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..200u32 {
                // Shared keys collide across workers, private keys do not
                let shared = format!("shared-{}", i % 10);
                let private = format!("worker-{}-{}", worker, i);
                let payload = vec![worker; (i % 32) as usize];

                cache.add(shared.clone(), payload.clone()).await;
                cache.add(private.clone(), payload.clone()).await;

                if let Some(value) = cache.get(&shared).await {
                    // Whoever wrote last, the payload is never torn
                    assert!(value.windows(2).all(|w| w[0] == w[1]));
                }
                if let Some(value) = cache.get(&private).await {
                    assert_eq!(value, payload);
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    cache.close().await.unwrap();
    assert!(!cache.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_close_while_clones_are_in_use() {
    let cache = Arc::new(Cache::spawn(Duration::from_millis(10)).unwrap());

    let writer = {
        let cache = cache.clone();
        tokio::spawn(async move {
            for i in 0..50u32 {
                cache.add(format!("k{}", i), "v").await;
                sleep(Duration::from_millis(1)).await;
            }
            cache
        })
    };

    // Closing through one clone waits for the reaper while another keeps writing
    cache.close().await.unwrap();
    assert!(!cache.is_running());

    let writer_clone = writer.await.unwrap();
    assert!(Arc::ptr_eq(&writer_clone, &cache));

    let sweeps = cache.stats().await.sweeps;
    sleep(Duration::from_millis(40)).await;
    assert_eq!(cache.stats().await.sweeps, sweeps);
}

// == Lifecycle Errors ==

#[tokio::test]
async fn test_zero_interval_is_rejected() {
    let result = Cache::spawn(Duration::ZERO);
    assert!(matches!(result, Err(CacheError::InvalidInterval)));
}

#[tokio::test]
async fn test_huge_interval_is_rejected() {
    let result = Cache::spawn(Duration::MAX);
    assert!(matches!(result, Err(CacheError::InvalidInterval)));
}

#[tokio::test]
async fn test_double_start_is_rejected() {
    let cache = Cache::spawn(Duration::from_secs(1)).unwrap();

    let err = cache.start().unwrap_err();

    assert!(matches!(err, CacheError::ReaperAlreadyRunning));
    cache.close().await.unwrap();
}
