//! Engine assembly: wires the cache, prefetcher, session, and position
//! manager together from an [`EngineConfig`].

use crate::config::PrefetchConfig;
use crate::prefetch::Prefetcher;
use crate::session::PerformanceSession;
use core_cache::{CacheConfig, ContentCache};
use core_runtime::events::CoreEvent;
use core_runtime::{EngineConfig, Error, EventBus, Result};
use core_setlist::PositionManager;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tracing::info;

/// The fully wired performance engine.
///
/// One instance per performance session; there is no global state, so
/// multiple independent engines (tests, multi-window hosts) can coexist.
pub struct PerformanceEngine {
    events: Arc<EventBus>,
    cache: Arc<ContentCache>,
    session: Arc<PerformanceSession>,
    position_manager: Arc<PositionManager>,
}

impl PerformanceEngine {
    /// Assemble an engine from a validated configuration.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let events = Arc::new(EventBus::new(config.event_capacity));

        let cache_config = CacheConfig::new()
            .with_max_total_bytes(config.max_cache_bytes)
            .with_verify_integrity(config.verify_integrity);
        let cache = Arc::new(
            ContentCache::new(cache_config, Arc::clone(&config.storage))
                .map_err(|e| Error::Config(e.to_string()))?
                .with_event_bus(Arc::clone(&events)),
        );

        let prefetcher = Arc::new(Prefetcher::new(
            Arc::clone(&cache),
            Arc::clone(&config.resolver),
            PrefetchConfig::new(config.prefetch_offsets.clone()),
        ));

        let session = Arc::new(
            PerformanceSession::new(
                Arc::clone(&cache),
                Arc::clone(&config.resolver),
                prefetcher,
            )
            .with_event_bus(Arc::clone(&events)),
        );

        let position_manager = Arc::new(PositionManager::new(Arc::clone(&config.setlist_store)));

        info!(
            max_cache_bytes = config.max_cache_bytes,
            prefetch_offsets = ?config.prefetch_offsets,
            "performance engine assembled"
        );

        Ok(Self {
            events,
            cache,
            session,
            position_manager,
        })
    }

    /// The navigation session.
    pub fn session(&self) -> &Arc<PerformanceSession> {
        &self.session
    }

    /// The setlist position manager.
    pub fn position_manager(&self) -> &Arc<PositionManager> {
        &self.position_manager
    }

    /// The content cache (diagnostics, warming).
    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::content::AssetPayload;
    use bridge_traits::mock::{MemorySetlistStore, MemoryStorage, ScriptedResolver};
    use core_runtime::events::NavigationEvent;
    use core_setlist::{ContentId, ContentSummary};

    #[tokio::test]
    async fn engine_assembles_and_navigates() {
        let content_id = ContentId::new();
        let resolver = ScriptedResolver::new().with_asset(
            &content_id.to_string(),
            AssetPayload::Url("https://cdn.example/opener.pdf".to_string()),
            "application/pdf",
        );

        let config = EngineConfig::builder()
            .storage(Arc::new(MemoryStorage::new()))
            .resolver(Arc::new(resolver))
            .setlist_store(Arc::new(MemorySetlistStore::new()))
            .max_cache_bytes(1024 * 1024)
            .build()
            .unwrap();

        let engine = PerformanceEngine::from_config(config).unwrap();
        let mut events = engine.subscribe();

        engine
            .session()
            .load_setlist(vec![ContentSummary::new(content_id, "Opener")]);
        engine.session().jump_to(0);

        // SetlistLoaded, SongChanged, then the displayed song.
        loop {
            match events.recv().await.unwrap() {
                CoreEvent::Navigation(NavigationEvent::SongDisplayed { index, .. }) => {
                    assert_eq!(index, 0);
                    break;
                }
                _ => continue,
            }
        }
        assert_eq!(engine.session().cache_metrics().entry_count, 1);
    }

    #[tokio::test]
    async fn engine_exposes_the_position_manager() {
        let store = Arc::new(MemorySetlistStore::new());
        let config = EngineConfig::builder()
            .storage(Arc::new(MemoryStorage::new()))
            .resolver(Arc::new(ScriptedResolver::new()))
            .setlist_store(Arc::clone(&store) as Arc<dyn bridge_traits::SetlistStore>)
            .build()
            .unwrap();
        let engine = PerformanceEngine::from_config(config).unwrap();

        let entries: Vec<_> = (1..=3)
            .map(|p| core_setlist::SetlistEntry::new(ContentId::new(), p))
            .collect();
        let setlist =
            core_setlist::Setlist::from_entries(core_setlist::SetlistId::new(), "set", entries);
        let seeded: Vec<(String, u32)> = setlist
            .entries
            .iter()
            .map(|e| (e.id.to_string(), e.position))
            .collect();
        let refs: Vec<(&str, u32)> = seeded.iter().map(|(id, p)| (id.as_str(), *p)).collect();
        store.seed(&setlist.id.to_string(), &refs);

        let moving = setlist.entries[2].id;
        let reordered = engine
            .position_manager()
            .reorder(&setlist, &moving, 1)
            .await
            .unwrap();
        assert_eq!(reordered.entries[0].id, moving);
        assert!(reordered.is_contiguous());
    }
}
