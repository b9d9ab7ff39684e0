//! Integration tests for the prefetch engine: window computation, stale
//! discard, and best-effort failure handling.

use bridge_traits::content::{AssetPayload, ContentResolver};
use bridge_traits::mock::{MemoryStorage, ScriptedResolver};
use bytes::Bytes;
use core_cache::{CacheConfig, CacheKey, ContentCache};
use core_performance::{PerformanceSession, PrefetchConfig, Prefetcher};
use core_setlist::{ContentId, ContentSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn new_cache() -> Arc<ContentCache> {
    Arc::new(
        ContentCache::new(CacheConfig::default(), Arc::new(MemoryStorage::new())).unwrap(),
    )
}

fn songs(n: usize) -> Vec<ContentSummary> {
    (0..n)
        .map(|i| ContentSummary::new(ContentId::new(), format!("Song {i}")))
        .collect()
}

fn key_of(summary: &ContentSummary) -> CacheKey {
    CacheKey::primary(summary.content_id.to_string())
}

fn resolver_serving(snapshot: &[ContentSummary]) -> ScriptedResolver {
    snapshot.iter().fold(ScriptedResolver::new(), |r, s| {
        r.with_asset(
            &s.content_id.to_string(),
            AssetPayload::Blob(Bytes::from(format!("chart for {}", s.title))),
            "application/pdf",
        )
    })
}

async fn wait_for_fresh(cache: &ContentCache, keys: &[CacheKey]) {
    'outer: for _ in 0..200 {
        for key in keys {
            if !cache.contains_fresh(key).await {
                sleep(Duration::from_millis(10)).await;
                continue 'outer;
            }
        }
        return;
    }
    panic!("expected keys never became fresh");
}

#[tokio::test]
async fn window_around_the_current_song_is_cached() {
    let snapshot = songs(6);
    let cache = new_cache();
    let resolver = Arc::new(resolver_serving(&snapshot));
    let prefetcher = Prefetcher::new(
        Arc::clone(&cache),
        resolver,
        PrefetchConfig::default(),
    );

    prefetcher.on_position_changed(&snapshot, 2);

    // Window is {1, 3, 4}.
    wait_for_fresh(
        &cache,
        &[key_of(&snapshot[1]), key_of(&snapshot[3]), key_of(&snapshot[4])],
    )
    .await;

    // The current song and out-of-window songs were not prefetched.
    assert!(!cache.contains_fresh(&key_of(&snapshot[0])).await);
    assert!(!cache.contains_fresh(&key_of(&snapshot[2])).await);
    assert!(!cache.contains_fresh(&key_of(&snapshot[5])).await);
}

#[tokio::test]
async fn window_clips_at_the_edges_of_the_set() {
    let snapshot = songs(3);
    let cache = new_cache();
    let resolver = Arc::new(resolver_serving(&snapshot));
    let prefetcher = Prefetcher::new(
        Arc::clone(&cache),
        resolver,
        PrefetchConfig::default(),
    );

    // At the last song only the previous one is in range.
    prefetcher.on_position_changed(&snapshot, 2);
    wait_for_fresh(&cache, &[key_of(&snapshot[1])]).await;
    assert!(!cache.contains_fresh(&key_of(&snapshot[0])).await);
}

#[tokio::test]
async fn already_fresh_entries_are_not_refetched() {
    let snapshot = songs(5);
    let cache = new_cache();
    cache
        .put(
            key_of(&snapshot[3]),
            AssetPayload::Blob(Bytes::from_static(b"already here")),
            "application/pdf",
        )
        .await
        .unwrap();

    let resolver = Arc::new(resolver_serving(&snapshot));
    let prefetcher = Prefetcher::new(
        Arc::clone(&cache),
        Arc::clone(&resolver) as Arc<dyn ContentResolver>,
        PrefetchConfig::default(),
    );

    prefetcher.on_position_changed(&snapshot, 2);
    wait_for_fresh(&cache, &[key_of(&snapshot[1]), key_of(&snapshot[4])]).await;

    assert!(
        !resolver
            .resolved_ids()
            .contains(&snapshot[3].content_id.to_string()),
        "a Fresh entry must not be refetched"
    );
}

#[tokio::test]
async fn results_for_an_abandoned_window_are_discarded() {
    let snapshot = songs(6);
    let cache = new_cache();
    let resolver = Arc::new(
        resolver_serving(&snapshot).with_delay(Duration::from_millis(120)),
    );
    let prefetcher = Prefetcher::new(
        Arc::clone(&cache),
        resolver,
        PrefetchConfig::default(),
    );

    // The performer skips from song 0 straight to song 5 while the first
    // window is still fetching.
    prefetcher.on_position_changed(&snapshot, 0);
    sleep(Duration::from_millis(20)).await;
    prefetcher.on_position_changed(&snapshot, 5);

    // New window {4} arrives; nothing from the old window {1, 2} lands.
    wait_for_fresh(&cache, &[key_of(&snapshot[4])]).await;
    sleep(Duration::from_millis(300)).await;
    assert!(!cache.contains_fresh(&key_of(&snapshot[1])).await);
    assert!(!cache.contains_fresh(&key_of(&snapshot[2])).await);
}

#[tokio::test]
async fn prefetch_failures_are_swallowed() {
    let snapshot = songs(4);
    let cache = new_cache();
    let resolver = ScriptedResolver::new()
        .with_failure(&snapshot[0].content_id.to_string(), "timeout")
        .with_failure(&snapshot[2].content_id.to_string(), "timeout")
        .with_failure(&snapshot[3].content_id.to_string(), "timeout");
    let prefetcher = Prefetcher::new(Arc::clone(&cache), Arc::new(resolver), PrefetchConfig::default());

    prefetcher.on_position_changed(&snapshot, 1);
    sleep(Duration::from_millis(150)).await;

    assert_eq!(cache.metrics().entry_count, 0);
}

#[tokio::test]
async fn navigation_kicks_the_prefetcher() {
    let snapshot = songs(5);
    let cache = new_cache();
    let resolver: Arc<dyn ContentResolver> = Arc::new(resolver_serving(&snapshot));
    let prefetcher = Arc::new(Prefetcher::new(
        Arc::clone(&cache),
        Arc::clone(&resolver),
        PrefetchConfig::default(),
    ));
    let session = PerformanceSession::new(Arc::clone(&cache), resolver, prefetcher);
    session.load_setlist(snapshot.clone());

    session.jump_to(1);

    // Current song lands via write-through, neighbors via prefetch.
    wait_for_fresh(
        &cache,
        &[
            key_of(&snapshot[0]),
            key_of(&snapshot[1]),
            key_of(&snapshot[2]),
            key_of(&snapshot[3]),
        ],
    )
    .await;
    assert!(!cache.contains_fresh(&key_of(&snapshot[4])).await);
}
