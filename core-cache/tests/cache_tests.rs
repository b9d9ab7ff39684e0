//! Integration tests for the content cache over an in-memory backing store.

use bridge_traits::content::AssetPayload;
use bridge_traits::mock::MemoryStorage;
use bytes::Bytes;
use core_cache::{CacheConfig, CacheError, CacheKey, ContentCache};
use std::sync::Arc;

const MB: u64 = 1024 * 1024;

fn cache_with_budget(max_bytes: u64) -> (ContentCache, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let cache = ContentCache::new(
        CacheConfig::new().with_max_total_bytes(max_bytes),
        storage.clone(),
    )
    .unwrap();
    (cache, storage)
}

fn blob(size: usize) -> AssetPayload {
    AssetPayload::Blob(Bytes::from(vec![0x42u8; size]))
}

#[tokio::test]
async fn put_then_get_round_trips_until_evicted() {
    let (cache, _) = cache_with_budget(MB);
    let key = CacheKey::primary("c1");

    cache
        .put(key.clone(), blob(1000), "application/pdf")
        .await
        .unwrap();

    let entry = cache.get(&key).await.expect("entry should be cached");
    assert_eq!(entry.size_bytes, 1000);
    assert_eq!(entry.mime_type, "application/pdf");
    assert!(entry.is_fresh());

    let metrics = cache.metrics();
    assert_eq!(metrics.entry_count, 1);
    assert_eq!(metrics.current_total_bytes, 1000);
    assert_eq!(metrics.hit_count, 1);
}

#[tokio::test]
async fn total_bytes_never_exceed_budget() {
    let (cache, _) = cache_with_budget(10_000);

    for i in 0..20 {
        let key = CacheKey::primary(format!("c{i}"));
        cache.put(key, blob(3000), "application/pdf").await.unwrap();
        assert!(cache.metrics().current_total_bytes <= 10_000);
    }
    // 3 entries of 3000 fit in 10_000; older ones were evicted.
    let metrics = cache.metrics();
    assert_eq!(metrics.entry_count, 3);
    assert!(metrics.eviction_count >= 17);
}

#[tokio::test]
async fn oversized_payload_is_rejected_outright() {
    let (cache, _) = cache_with_budget(1000);
    let err = cache
        .put(CacheKey::primary("big"), blob(1001), "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::QuotaExceeded { requested: 1001, budget: 1000 }));
    assert_eq!(cache.metrics().entry_count, 0);
}

#[tokio::test]
async fn least_recently_accessed_goes_first() {
    let (cache, _) = cache_with_budget(3000);

    let (a, b, c) = (
        CacheKey::primary("a"),
        CacheKey::primary("b"),
        CacheKey::primary("c"),
    );
    cache.put(a.clone(), blob(1000), "x").await.unwrap();
    cache.put(b.clone(), blob(1000), "x").await.unwrap();
    cache.put(c.clone(), blob(1000), "x").await.unwrap();

    // Touch a and c; b becomes the least recently accessed.
    cache.get(&a).await.unwrap();
    cache.get(&c).await.unwrap();

    cache
        .put(CacheKey::primary("d"), blob(1000), "x")
        .await
        .unwrap();

    assert!(cache.get(&a).await.is_some());
    assert!(cache.get(&b).await.is_none(), "b was the LRU victim");
    assert!(cache.get(&c).await.is_some());
}

#[tokio::test]
async fn eviction_ties_break_by_insertion_order() {
    let (cache, _) = cache_with_budget(2000);

    // Neither entry is ever accessed after insertion; the older insert
    // must be evicted first.
    let first = CacheKey::primary("first");
    let second = CacheKey::primary("second");
    cache.put(first.clone(), blob(1000), "x").await.unwrap();
    cache.put(second.clone(), blob(1000), "x").await.unwrap();

    cache
        .put(CacheKey::primary("third"), blob(1000), "x")
        .await
        .unwrap();

    assert!(cache.get(&first).await.is_none());
    assert!(cache.get(&second).await.is_some());
}

#[tokio::test]
async fn pinned_current_song_survives_pressure() {
    // Budget 10MB; A=6MB pinned as the current song, then B=6MB arrives.
    let (cache, _) = cache_with_budget(10 * MB);
    let a = CacheKey::primary("a");
    let b = CacheKey::primary("b");

    cache
        .put(a.clone(), blob(6 * MB as usize), "application/pdf")
        .await
        .unwrap();
    cache.pin(Some(a.clone()));

    // No non-pinned entries exist, so B cannot fit.
    let err = cache
        .put(b.clone(), blob(6 * MB as usize), "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::QuotaExceeded { .. }));
    assert!(cache.get(&a).await.is_some(), "pinned entry must remain");

    // With a non-pinned older entry present, that one goes instead.
    cache.pin(None);
    cache
        .put(CacheKey::primary("c"), blob(2 * MB as usize), "x")
        .await
        .unwrap();
    cache.pin(Some(a.clone()));
    cache
        .put(b.clone(), blob(4 * MB as usize), "application/pdf")
        .await
        .unwrap();
    assert!(cache.get(&a).await.is_some(), "pinned entry still cached");
    assert!(cache.get(&b).await.is_some());
    assert!(
        cache.get(&CacheKey::primary("c")).await.is_none(),
        "non-pinned entry was evicted instead"
    );
}

#[tokio::test]
async fn corrupt_entries_read_as_misses_and_are_discarded() {
    let (cache, _) = cache_with_budget(MB);
    let key = CacheKey::primary("c1");

    // A URL payload that later turns blank fails the integrity check.
    cache
        .put(key.clone(), AssetPayload::Url("https://cdn/x.pdf".into()), "application/pdf")
        .await
        .unwrap();
    assert!(cache.get(&key).await.is_some());

    cache.mark_stale(&key).await;
    assert!(cache.get(&key).await.is_none(), "stale entries are misses");

    // Refresh, then corrupt via an empty put attempt: rejected up front.
    let err = cache
        .put(key.clone(), AssetPayload::Url("  ".into()), "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::Corrupt(_)));
}

#[tokio::test]
async fn replacing_an_entry_reuses_its_bytes() {
    let (cache, _) = cache_with_budget(1000);
    let key = CacheKey::primary("c1");

    cache.put(key.clone(), blob(800), "x").await.unwrap();
    // The replacement would not fit next to the original, but replacement
    // frees the original's bytes as part of the same decision.
    cache.put(key.clone(), blob(900), "x").await.unwrap();

    let metrics = cache.metrics();
    assert_eq!(metrics.entry_count, 1);
    assert_eq!(metrics.current_total_bytes, 900);
}

#[tokio::test]
async fn write_through_and_warm_round_trip() {
    let storage = Arc::new(MemoryStorage::new());
    let key = CacheKey::primary("c1");

    {
        let cache = ContentCache::new(
            CacheConfig::new().with_max_total_bytes(MB),
            storage.clone(),
        )
        .unwrap();
        cache
            .put(key.clone(), blob(500), "application/pdf")
            .await
            .unwrap();
        assert_eq!(storage.keys().await, vec!["c1/primary".to_string()]);
    }

    // A fresh session warms from the persisted copy.
    let cache = ContentCache::new(
        CacheConfig::new().with_max_total_bytes(MB),
        storage.clone(),
    )
    .unwrap();
    assert!(cache.get(&key).await.is_none());
    let loaded = cache.warm_from_storage(&[key.clone()]).await.unwrap();
    assert_eq!(loaded, 1);

    let entry = cache.get(&key).await.expect("warmed entry is servable");
    assert_eq!(entry.mime_type, "application/pdf");
    assert_eq!(entry.size_bytes, 500);
}

#[tokio::test]
async fn storage_failure_degrades_to_memory_only() {
    let storage = Arc::new(MemoryStorage::new());
    let cache = ContentCache::new(
        CacheConfig::new().with_max_total_bytes(MB),
        storage.clone(),
    )
    .unwrap();

    storage.set_available(false);

    // The put still succeeds; the cache goes memory-only.
    let key = CacheKey::primary("c1");
    cache.put(key.clone(), blob(100), "x").await.unwrap();
    assert!(cache.is_degraded());
    assert!(cache.get(&key).await.is_some());

    // Storage coming back mid-session is not retried; still memory-only.
    storage.set_available(true);
    cache.put(CacheKey::primary("c2"), blob(100), "x").await.unwrap();
    assert!(storage.keys().await.is_empty());
}

#[tokio::test]
async fn evict_if_needed_frees_headroom() {
    let (cache, _) = cache_with_budget(3000);
    for i in 0..3 {
        cache
            .put(CacheKey::primary(format!("c{i}")), blob(1000), "x")
            .await
            .unwrap();
    }

    let evicted = cache.evict_if_needed(1500).await.unwrap();
    assert_eq!(evicted, 2);
    assert!(cache.metrics().current_total_bytes <= 1500);

    // Already enough headroom: a no-op.
    assert_eq!(cache.evict_if_needed(1000).await.unwrap(), 0);
}

#[tokio::test]
async fn metrics_track_hits_and_misses() {
    let (cache, _) = cache_with_budget(MB);
    let key = CacheKey::primary("c1");

    assert!(cache.get(&key).await.is_none());
    cache.put(key.clone(), blob(10), "x").await.unwrap();
    cache.get(&key).await.unwrap();
    cache.get(&key).await.unwrap();

    let metrics = cache.metrics();
    assert_eq!(metrics.hit_count, 2);
    assert_eq!(metrics.miss_count, 1);
    assert!((metrics.hit_rate - 2.0 / 3.0).abs() < 1e-9);
}
