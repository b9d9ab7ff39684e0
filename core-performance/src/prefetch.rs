//! # Prefetch Engine
//!
//! Proactively fills the content cache for the songs adjacent to the
//! current one, so the common case of stepping through the set in order is
//! always a cache hit.
//!
//! Prefetching is strictly best-effort: every failure is swallowed here
//! (logged, never surfaced), because the navigation controller's fallback
//! chain is the correctness backstop. The caller is never blocked; each
//! window recomputation cancels the previous window's token and results for
//! indices that left the window are discarded rather than written.

use crate::config::PrefetchConfig;
use bridge_traits::ContentResolver;
use core_cache::{CacheKey, ContentCache};
use core_setlist::ContentSummary;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct PrefetchWindow {
    token: CancellationToken,
    indices: Vec<usize>,
}

/// Watches the navigation position and populates the cache for the songs
/// around it.
pub struct Prefetcher {
    cache: Arc<ContentCache>,
    resolver: Arc<dyn ContentResolver>,
    config: PrefetchConfig,
    window: Arc<parking_lot::Mutex<PrefetchWindow>>,
}

impl Prefetcher {
    pub fn new(
        cache: Arc<ContentCache>,
        resolver: Arc<dyn ContentResolver>,
        config: PrefetchConfig,
    ) -> Self {
        Self {
            cache,
            resolver,
            config,
            window: Arc::new(parking_lot::Mutex::new(PrefetchWindow {
                token: CancellationToken::new(),
                indices: Vec::new(),
            })),
        }
    }

    /// Recompute the prefetch window around `current_index` and fetch what
    /// is missing. Synchronous and non-blocking: fetches run as spawned
    /// tasks. The previous window's in-flight work is cancelled.
    pub fn on_position_changed(&self, snapshot: &[ContentSummary], current_index: usize) {
        let indices = self.config.window_for(current_index, snapshot.len());
        debug!(current_index, ?indices, "prefetch window recomputed");

        let token = {
            let mut window = self.window.lock();
            window.token.cancel();
            window.token = CancellationToken::new();
            window.indices = indices.clone();
            window.token.clone()
        };

        for index in indices {
            let summary = snapshot[index].clone();
            let cache = Arc::clone(&self.cache);
            let resolver = Arc::clone(&self.resolver);
            let window = Arc::clone(&self.window);
            let token = token.clone();

            tokio::spawn(async move {
                let content_id = summary.content_id.to_string();
                let key = CacheKey::primary(content_id.clone());

                if cache.contains_fresh(&key).await {
                    return;
                }

                let resolved = tokio::select! {
                    _ = token.cancelled() => {
                        debug!(index, "prefetch cancelled");
                        return;
                    }
                    resolved = resolver.resolve_asset(&content_id) => resolved,
                };

                let asset = match resolved {
                    Ok(asset) => asset,
                    Err(e) => {
                        // Best-effort: navigation's fallback chain covers it.
                        debug!(index, error = %e, "prefetch resolution failed");
                        return;
                    }
                };

                // The window may have moved while the fetch was in flight;
                // don't waste a cache write on a song nobody is near.
                let still_wanted = {
                    let window = window.lock();
                    !token.is_cancelled() && window.indices.contains(&index)
                };
                if !still_wanted {
                    debug!(index, "stale prefetch result discarded");
                    return;
                }

                if let Err(e) = cache.put(key, asset.payload, &asset.mime_type).await {
                    debug!(index, error = %e, "prefetch cache write skipped");
                }
            });
        }
    }

    /// Cancel all in-flight prefetches, e.g. when the setlist is replaced.
    pub fn cancel_all(&self) {
        let mut window = self.window.lock();
        window.token.cancel();
        window.token = CancellationToken::new();
        window.indices.clear();
    }
}
