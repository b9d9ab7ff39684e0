//! Cache keys, entries, and budget accounting.

use bridge_traits::content::AssetPayload;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Which asset of a content record a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetVariant {
    /// The primary performance file (chart PDF, lyric sheet image).
    Primary,
    /// Attached artwork / thumbnail.
    Artwork,
}

impl AssetVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetVariant::Primary => "primary",
            AssetVariant::Artwork => "artwork",
        }
    }
}

/// Cache key, derived deterministically from a content id plus variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub content_id: String,
    pub variant: AssetVariant,
}

impl CacheKey {
    pub fn new(content_id: impl Into<String>, variant: AssetVariant) -> Self {
        Self {
            content_id: content_id.into(),
            variant,
        }
    }

    /// Key for a content record's primary asset.
    pub fn primary(content_id: impl Into<String>) -> Self {
        Self::new(content_id, AssetVariant::Primary)
    }

    /// The flat string key used against the backing store.
    pub fn storage_key(&self) -> String {
        format!("{}/{}", self.content_id, self.variant.as_str())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.content_id, self.variant.as_str())
    }
}

/// Lifecycle state of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// Usable as-is.
    Fresh,
    /// Kept but must be refetched before use (e.g. the upstream content
    /// record changed).
    Stale,
    /// Failed an integrity check; treated as a miss and evicted eagerly.
    Corrupt,
}

/// One cached asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: AssetPayload,
    pub mime_type: String,
    pub size_bytes: u64,
    /// SHA-256 of blob payloads; `None` for URL payloads.
    pub content_hash: Option<String>,
    pub state: CacheState,
    /// Unix timestamp of insertion.
    pub cached_at: i64,
    /// Unix timestamp of the most recent hit. Display metadata; eviction
    /// ordering uses `last_access_seq`.
    pub last_accessed_at: i64,
    /// Monotonic insertion counter, the eviction tie-breaker.
    pub insert_seq: u64,
    /// Monotonic access counter; strictly orders recency even when two
    /// accesses land on the same timestamp.
    pub last_access_seq: u64,
}

impl CacheEntry {
    pub fn new(key: CacheKey, payload: AssetPayload, mime_type: String, seq: u64) -> Self {
        let now = chrono::Utc::now().timestamp();
        let size_bytes = payload.size_bytes();
        let content_hash = match &payload {
            AssetPayload::Blob(data) => Some(hash_bytes(data)),
            AssetPayload::Url(_) => None,
        };

        Self {
            key,
            payload,
            mime_type,
            size_bytes,
            content_hash,
            state: CacheState::Fresh,
            cached_at: now,
            last_accessed_at: now,
            insert_seq: seq,
            last_access_seq: seq,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.state == CacheState::Fresh
    }

    /// Record a hit.
    pub fn touch(&mut self, access_seq: u64) {
        self.last_accessed_at = chrono::Utc::now().timestamp();
        self.last_access_seq = access_seq;
    }

    /// Basic integrity check: a servable payload, and (when `verify` is on)
    /// a blob hash that still matches.
    pub fn integrity_ok(&self, verify: bool) -> bool {
        if self.payload.is_empty() {
            return false;
        }
        if verify {
            if let (AssetPayload::Blob(data), Some(expected)) = (&self.payload, &self.content_hash)
            {
                return hash_bytes(data) == *expected;
            }
        }
        true
    }
}

/// Hash used for payload integrity verification.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Process-wide byte accounting for the cache.
///
/// Mutated only under the cache's interior lock, so increments and
/// decrements from concurrent callers can never interleave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBudget {
    pub max_total_bytes: u64,
    pub current_total_bytes: u64,
}

impl CacheBudget {
    pub fn new(max_total_bytes: u64) -> Self {
        Self {
            max_total_bytes,
            current_total_bytes: 0,
        }
    }

    /// Would `size` fit right now, without eviction?
    pub fn fits(&self, size: u64) -> bool {
        self.current_total_bytes + size <= self.max_total_bytes
    }

    pub fn charge(&mut self, size: u64) {
        self.current_total_bytes += size;
    }

    pub fn release(&mut self, size: u64) {
        self.current_total_bytes = self.current_total_bytes.saturating_sub(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn storage_key_is_deterministic() {
        let key = CacheKey::primary("content-1");
        assert_eq!(key.storage_key(), "content-1/primary");
        assert_eq!(key, CacheKey::new("content-1", AssetVariant::Primary));
        assert_ne!(key, CacheKey::new("content-1", AssetVariant::Artwork));
    }

    #[test]
    fn blob_entries_carry_a_hash() {
        let entry = CacheEntry::new(
            CacheKey::primary("c"),
            AssetPayload::Blob(Bytes::from_static(b"chart")),
            "application/pdf".to_string(),
            1,
        );
        assert!(entry.content_hash.is_some());
        assert_eq!(entry.size_bytes, 5);
        assert!(entry.integrity_ok(true));
    }

    #[test]
    fn url_entries_skip_hashing_but_check_emptiness() {
        let entry = CacheEntry::new(
            CacheKey::primary("c"),
            AssetPayload::Url("https://cdn/x.pdf".to_string()),
            "application/pdf".to_string(),
            1,
        );
        assert!(entry.content_hash.is_none());
        assert!(entry.integrity_ok(true));

        let empty = CacheEntry::new(
            CacheKey::primary("c"),
            AssetPayload::Url("  ".to_string()),
            "application/pdf".to_string(),
            2,
        );
        assert!(!empty.integrity_ok(false));
    }

    #[test]
    fn tampered_blob_fails_verification() {
        let mut entry = CacheEntry::new(
            CacheKey::primary("c"),
            AssetPayload::Blob(Bytes::from_static(b"original")),
            "text/plain".to_string(),
            1,
        );
        entry.payload = AssetPayload::Blob(Bytes::from_static(b"tampered"));
        assert!(!entry.integrity_ok(true));
        // With verification off, only emptiness is checked.
        assert!(entry.integrity_ok(false));
    }

    #[test]
    fn budget_accounting() {
        let mut budget = CacheBudget::new(100);
        assert!(budget.fits(100));
        budget.charge(60);
        assert!(!budget.fits(50));
        budget.release(20);
        assert_eq!(budget.current_total_bytes, 40);
        assert!(budget.fits(50));
        budget.release(1000);
        assert_eq!(budget.current_total_bytes, 0);
    }
}
