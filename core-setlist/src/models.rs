//! Setlist domain models

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a setlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetlistId(pub Uuid);

impl SetlistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SetlistId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SetlistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a setlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference into the external content records. The engine never owns the
/// content itself, only the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub Uuid);

impl ContentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Setlist
// =============================================================================

/// One song slot in a setlist.
///
/// Owned exclusively by its setlist; removed entries are gone, not orphaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetlistEntry {
    pub id: EntryId,
    pub content_id: ContentId,
    /// 1-based rank within the setlist.
    pub position: u32,
    /// Free-text performance note ("capo 2", "acoustic").
    pub note: Option<String>,
}

impl SetlistEntry {
    pub fn new(content_id: ContentId, position: u32) -> Self {
        Self {
            id: EntryId::new(),
            content_id,
            position,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// An ordered list of songs selected for a performance.
///
/// Invariant: entry positions are exactly `1..=N`, no duplicates, no gaps,
/// and `entries` is sorted by position. Construction through
/// [`Setlist::from_entries`] sorts; whether the positions themselves satisfy
/// the invariant is checked with [`Setlist::is_contiguous`] (a setlist read
/// back after a partial position batch may legitimately be stale).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setlist {
    pub id: SetlistId,
    pub name: String,
    pub entries: Vec<SetlistEntry>,
}

impl Setlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SetlistId::new(),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Build a setlist from entries in any order; entries are sorted by
    /// position.
    pub fn from_entries(
        id: SetlistId,
        name: impl Into<String>,
        mut entries: Vec<SetlistEntry>,
    ) -> Self {
        entries.sort_by_key(|e| e.position);
        Self {
            id,
            name: name.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: &EntryId) -> Option<&SetlistEntry> {
        self.entries.iter().find(|e| e.id == *id)
    }

    /// Returns `true` when positions are exactly `1..=N` in order.
    pub fn is_contiguous(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, e)| e.position == (i + 1) as u32)
    }

    /// Content ids in performance order.
    pub fn content_ids(&self) -> Vec<ContentId> {
        self.entries.iter().map(|e| e.content_id).collect()
    }
}

// =============================================================================
// Content metadata
// =============================================================================

/// Content that is playable straight from the entry metadata, no asset
/// resolution required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum InlineContent {
    /// Plain lyrics text.
    Lyrics(String),
    /// Chord chart text (ChordPro or similar).
    Chords(String),
}

impl InlineContent {
    pub fn text(&self) -> &str {
        match self {
            InlineContent::Lyrics(text) | InlineContent::Chords(text) => text,
        }
    }
}

/// Display metadata for one song, snapshotted for navigation.
///
/// Carries everything the UI needs to update synchronously on a song change
/// (title, artist, counter) plus the inline fallback content, so no
/// navigation ever waits on a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub content_id: ContentId,
    pub title: String,
    pub artist: Option<String>,
    pub inline: Option<InlineContent>,
}

impl ContentSummary {
    pub fn new(content_id: ContentId, title: impl Into<String>) -> Self {
        Self {
            content_id,
            title: title.into(),
            artist: None,
            inline: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_inline(mut self, inline: InlineContent) -> Self {
        self.inline = Some(inline);
        self
    }
}
