//! Navigation state machine types.

use bridge_traits::content::AssetPayload;
use core_setlist::{ContentSummary, InlineContent};
use serde::{Deserialize, Serialize};

/// The resolved, displayable content for one song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedContent {
    /// A playable asset (cached or remotely resolved).
    Asset {
        payload: AssetPayload,
        mime_type: String,
    },
    /// Inline lyrics/chords straight from the entry metadata.
    Inline(InlineContent),
}

/// Status of the current song's content pane.
///
/// Transitions: `Idle → Resolving → Displayed`, `Resolving → Failed` when
/// the whole fallback chain comes up empty, and `Failed → Resolving` when
/// the user re-navigates to the song. `Failed` is per-song: the title and
/// counter stay visible and navigation elsewhere is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NavStatus {
    /// No song has been displayed yet.
    Idle,
    /// Metadata is on screen; the content pane is loading.
    Resolving,
    /// Content is on screen.
    Displayed { content: ResolvedContent },
    /// The content pane shows an explicit "unavailable" placeholder,
    /// distinct from the loading state.
    Failed { reason: String },
}

/// The navigation controller's full observable state.
///
/// Rebuilt whenever the underlying setlist changes; mutated only by the
/// owning session in response to discrete navigation events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// 0-based index of the current song.
    pub current_index: usize,
    /// Ordered display metadata for every song in the set.
    pub snapshot: Vec<ContentSummary>,
    pub status: NavStatus,
}

impl NavigationState {
    pub fn empty() -> Self {
        Self {
            current_index: 0,
            snapshot: Vec::new(),
            status: NavStatus::Idle,
        }
    }

    pub fn with_snapshot(snapshot: Vec<ContentSummary>) -> Self {
        Self {
            current_index: 0,
            snapshot,
            status: NavStatus::Idle,
        }
    }

    pub fn song_count(&self) -> usize {
        self.snapshot.len()
    }

    /// Metadata of the current song, `None` for an empty setlist.
    pub fn current_summary(&self) -> Option<&ContentSummary> {
        self.snapshot.get(self.current_index)
    }

    /// 1-based position counter for display, e.g. `"3 / 12"`.
    pub fn counter(&self) -> String {
        if self.snapshot.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current_index + 1, self.snapshot.len())
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_setlist::ContentId;

    fn summaries(n: usize) -> Vec<ContentSummary> {
        (0..n)
            .map(|i| ContentSummary::new(ContentId::new(), format!("Song {i}")))
            .collect()
    }

    #[test]
    fn fresh_state_is_idle_at_the_first_song() {
        let state = NavigationState::with_snapshot(summaries(3));
        assert_eq!(state.current_index, 0);
        assert_eq!(state.status, NavStatus::Idle);
        assert_eq!(state.current_summary().unwrap().title, "Song 0");
        assert_eq!(state.counter(), "1 / 3");
    }

    #[test]
    fn empty_setlist_has_a_safe_counter() {
        let state = NavigationState::empty();
        assert_eq!(state.counter(), "0 / 0");
        assert!(state.current_summary().is_none());
    }
}
