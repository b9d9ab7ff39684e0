//! # Navigation Controller
//!
//! The state machine a performer drives during a show.
//!
//! ## Design
//!
//! Navigation entry points are synchronous: they update the current index
//! and displayed metadata immediately (the sub-100ms feedback the performer
//! perceives), then resolve the content pane off the critical path through
//! the fallback chain cache → remote → inline → placeholder. No navigation
//! call ever waits on I/O.
//!
//! A navigation issued while a previous resolution is still in flight
//! supersedes it: each navigation bumps a generation counter, and a
//! resolution task applies its outcome only if its generation is still
//! current. State therefore always reflects the order navigations were
//! issued, never the order their resolutions happened to complete.

use crate::error::{PerformanceError, Result};
use crate::prefetch::Prefetcher;
use crate::state::{NavStatus, NavigationState, ResolvedContent};
use bridge_traits::ContentResolver;
use core_cache::{CacheKey, CacheMetrics, ContentCache};
use core_runtime::events::{ContentSource, CoreEvent, NavigationEvent};
use core_runtime::EventBus;
use core_setlist::ContentSummary;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A live performance-mode session over one setlist snapshot.
pub struct PerformanceSession {
    state: Arc<parking_lot::Mutex<NavigationState>>,
    cache: Arc<ContentCache>,
    resolver: Arc<dyn ContentResolver>,
    prefetcher: Arc<Prefetcher>,
    event_bus: Option<Arc<EventBus>>,
    generation: Arc<AtomicU64>,
}

impl PerformanceSession {
    pub fn new(
        cache: Arc<ContentCache>,
        resolver: Arc<dyn ContentResolver>,
        prefetcher: Arc<Prefetcher>,
    ) -> Self {
        Self {
            state: Arc::new(parking_lot::Mutex::new(NavigationState::empty())),
            cache,
            resolver,
            prefetcher,
            event_bus: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set event bus for navigation events.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Replace the setlist snapshot and rebuild navigation state.
    ///
    /// The session starts at index 0 in `Idle`; call `jump_to(0)` to put
    /// the first song on screen. In-flight resolutions and prefetches for
    /// the old snapshot are superseded.
    pub fn load_setlist(&self, snapshot: Vec<ContentSummary>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.prefetcher.cancel_all();
        self.cache.pin(None);

        let song_count = snapshot.len();
        *self.state.lock() = NavigationState::with_snapshot(snapshot);
        self.emit(NavigationEvent::SetlistLoaded { song_count });
    }

    /// Advance to the next song. A no-op at the end of the set.
    pub fn next(&self) {
        let index = self.state.lock().current_index;
        self.navigate(index + 1);
    }

    /// Go back one song. A no-op at the start of the set.
    pub fn prev(&self) {
        let index = self.state.lock().current_index;
        if index == 0 {
            debug!("already at the first song, prev ignored");
            return;
        }
        self.navigate(index - 1);
    }

    /// Jump to an arbitrary song. Out-of-range indices are no-ops (the UI
    /// disables the controls, but the session stays defensive). Jumping to
    /// the current song re-resolves it, which is also the retry path after
    /// a `Failed` resolution.
    pub fn jump_to(&self, index: usize) {
        self.navigate(index);
    }

    /// Cloned snapshot of the current navigation state.
    pub fn current_state(&self) -> NavigationState {
        self.state.lock().clone()
    }

    /// Cache effectiveness snapshot for the diagnostics surface.
    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }

    fn navigate(&self, index: usize) {
        // Synchronous part: index, metadata, and status flip immediately.
        let (summary, snapshot) = {
            let mut state = self.state.lock();
            if index >= state.snapshot.len() {
                debug!(index, songs = state.snapshot.len(), "navigation out of range, ignored");
                return;
            }
            state.current_index = index;
            state.status = NavStatus::Resolving;
            (state.snapshot[index].clone(), state.snapshot.clone())
        };

        let content_id = summary.content_id.to_string();
        let key = CacheKey::primary(content_id.clone());

        // Pin before any resolution or prefetch can trigger eviction, so
        // the song now on stage can never be evicted mid-display.
        self.cache.pin(Some(key.clone()));
        self.emit(NavigationEvent::SongChanged {
            index,
            content_id: content_id.clone(),
        });

        // Asynchronous part: resolve the content pane. The generation
        // check makes a superseded resolution drop its result.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let task = ResolutionTask {
            state: Arc::clone(&self.state),
            cache: Arc::clone(&self.cache),
            resolver: Arc::clone(&self.resolver),
            event_bus: self.event_bus.clone(),
            generation_counter: Arc::clone(&self.generation),
            generation,
            index,
            summary,
            key,
        };
        tokio::spawn(task.run());

        self.prefetcher.on_position_changed(&snapshot, index);
    }

    fn emit(&self, event: NavigationEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Navigation(event));
        }
    }
}

/// One song's async resolution, racing the fallback chain against newer
/// navigations.
struct ResolutionTask {
    state: Arc<parking_lot::Mutex<NavigationState>>,
    cache: Arc<ContentCache>,
    resolver: Arc<dyn ContentResolver>,
    event_bus: Option<Arc<EventBus>>,
    generation_counter: Arc<AtomicU64>,
    generation: u64,
    index: usize,
    summary: ContentSummary,
    key: CacheKey,
}

impl ResolutionTask {
    async fn run(self) {
        let outcome = self.resolve().await;

        // Superseded by a newer navigation: the performer has moved on and
        // this result must not overwrite their current song.
        if self.generation_counter.load(Ordering::SeqCst) != self.generation {
            debug!(index = self.index, "navigation superseded, resolution discarded");
            return;
        }

        let event = {
            let mut state = self.state.lock();
            if self.generation_counter.load(Ordering::SeqCst) != self.generation {
                return;
            }
            match outcome {
                Ok((content, source)) => {
                    state.status = NavStatus::Displayed { content };
                    NavigationEvent::SongDisplayed {
                        index: self.index,
                        source,
                    }
                }
                Err(e) => {
                    warn!(index = self.index, error = %e, "song content unavailable");
                    state.status = NavStatus::Failed {
                        reason: e.to_string(),
                    };
                    NavigationEvent::ResolutionFailed {
                        index: self.index,
                        reason: e.to_string(),
                    }
                }
            }
        };

        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Navigation(event));
        }
    }

    /// The fallback chain: Fresh cache hit, then remote resolution with
    /// write-through, then inline content, then a per-song failure.
    async fn resolve(&self) -> Result<(ResolvedContent, ContentSource)> {
        if let Some(entry) = self.cache.get(&self.key).await {
            return Ok((
                ResolvedContent::Asset {
                    payload: entry.payload,
                    mime_type: entry.mime_type,
                },
                ContentSource::Cache,
            ));
        }

        let content_id = self.summary.content_id.to_string();
        let remote_failure = match self.resolver.resolve_asset(&content_id).await {
            Ok(asset) => {
                if let Err(e) = self
                    .cache
                    .put(self.key.clone(), asset.payload.clone(), &asset.mime_type)
                    .await
                {
                    debug!(key = %self.key, error = %e, "write-through skipped");
                }
                return Ok((
                    ResolvedContent::Asset {
                        payload: asset.payload,
                        mime_type: asset.mime_type,
                    },
                    ContentSource::Remote,
                ));
            }
            Err(e) => e,
        };

        if let Some(inline) = self.summary.inline.clone() {
            return Ok((ResolvedContent::Inline(inline), ContentSource::Inline));
        }

        Err(PerformanceError::ResolutionFailed(
            remote_failure.to_string(),
        ))
    }
}
