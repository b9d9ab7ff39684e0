//! # Event Bus System
//!
//! Decoupled communication between engine components and the host UI using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The navigation controller and the content cache publish typed events; any
//! number of subscribers (UI layer, telemetry, tests) consume them
//! independently. Events are advisory: no engine correctness property depends
//! on a subscriber keeping up.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, NavigationEvent};
//!
//! let bus = EventBus::new(100);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Navigation(NavigationEvent::SongChanged {
//!     index: 2,
//!     content_id: "content-abc".to_string(),
//! }))
//! .ok();
//! ```
//!
//! ## Error Handling
//!
//! `broadcast` subscribers that fall behind receive `RecvError::Lagged(n)`;
//! this is non-fatal and the subscriber keeps receiving newer events.
//! `RecvError::Closed` signals shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Performance-mode navigation events
    Navigation(NavigationEvent),
    /// Offline cache events
    Cache(CacheEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &'static str {
        match self {
            CoreEvent::Navigation(e) => e.description(),
            CoreEvent::Cache(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Navigation(NavigationEvent::ResolutionFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Cache(CacheEvent::StorageDegraded) => EventSeverity::Warning,
            CoreEvent::Navigation(NavigationEvent::SongChanged { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Navigation Events
// ============================================================================

/// Where a displayed song's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Served from the offline cache.
    Cache,
    /// Resolved remotely and written through to the cache.
    Remote,
    /// Inline lyrics/chords from the entry metadata; no asset involved.
    Inline,
}

/// Events emitted by the navigation controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NavigationEvent {
    /// The performer moved to another song. Emitted synchronously on
    /// navigation, before content resolution starts.
    SongChanged { index: usize, content_id: String },
    /// The song's content finished resolving and is on screen.
    SongDisplayed { index: usize, source: ContentSource },
    /// Every source in the fallback chain failed for this song; the content
    /// pane shows a placeholder. Other songs are unaffected.
    ResolutionFailed { index: usize, reason: String },
    /// A new setlist snapshot was loaded and navigation state was rebuilt.
    SetlistLoaded { song_count: usize },
}

impl NavigationEvent {
    pub fn description(&self) -> &'static str {
        match self {
            NavigationEvent::SongChanged { .. } => "Moved to another song",
            NavigationEvent::SongDisplayed { .. } => "Song content displayed",
            NavigationEvent::ResolutionFailed { .. } => "Song content unavailable",
            NavigationEvent::SetlistLoaded { .. } => "Setlist loaded",
        }
    }
}

// ============================================================================
// Cache Events
// ============================================================================

/// Events emitted by the offline content cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CacheEvent {
    /// An asset was inserted into the cache.
    EntryCached { key: String, size_bytes: u64 },
    /// An entry was evicted to make room.
    EntryEvicted { key: String, size_bytes: u64 },
    /// The backing store became unavailable; the cache switched to
    /// memory-only mode for the rest of the session. Emitted at most once.
    StorageDegraded,
}

impl CacheEvent {
    pub fn description(&self) -> &'static str {
        match self {
            CacheEvent::EntryCached { .. } => "Asset cached",
            CacheEvent::EntryEvicted { .. } => "Cache entry evicted",
            CacheEvent::StorageDegraded => "Cache storage degraded to memory-only",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for engine events.
///
/// Fully thread-safe (`Send + Sync`); share across tasks with `Arc`.
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// `capacity` is the per-subscriber buffer; a subscriber that falls
    /// behind by more than this receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error when
    /// there are none. Publishers treat that error as "nobody is listening"
    /// and ignore it.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new independent subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_all_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = CoreEvent::Cache(CacheEvent::EntryCached {
            key: "c1/primary".to_string(),
            size_bytes: 42,
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(rx1.recv().await.unwrap(), event);
        assert_eq!(rx2.recv().await.unwrap(), event);
    }

    #[test]
    fn emit_without_subscribers_is_an_error_not_a_panic() {
        let bus = EventBus::new(16);
        assert!(bus
            .emit(CoreEvent::Cache(CacheEvent::StorageDegraded))
            .is_err());
    }

    #[test]
    fn severity_classification() {
        let failed = CoreEvent::Navigation(NavigationEvent::ResolutionFailed {
            index: 3,
            reason: "offline".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Warning);

        let changed = CoreEvent::Navigation(NavigationEvent::SongChanged {
            index: 0,
            content_id: "c".to_string(),
        });
        assert_eq!(changed.severity(), EventSeverity::Info);
    }

    #[test]
    fn events_serialize_for_host_consumption() {
        let event = CoreEvent::Navigation(NavigationEvent::SongDisplayed {
            index: 1,
            source: ContentSource::Cache,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SongDisplayed"));
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
