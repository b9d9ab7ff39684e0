//! # Content Cache Store
//!
//! Byte-budgeted local store for performance assets.
//!
//! The cache holds entries in memory (with optional write-through to a
//! persistent [`StorageAdapter`]) and answers `get` without ever fetching
//! remotely; filling it is the prefetcher's and navigation controller's
//! job. When a new entry does not fit the budget, least-recently-accessed
//! entries are evicted first, except the pinned key — the currently
//! displayed song is never evicted out from under the performer.
//!
//! All index and budget mutation happens under one async mutex, so two
//! concurrent `put` calls can never both conclude they have room for
//! payloads whose combined size exceeds the budget, and no caller ever
//! observes a half-evicted state.

use crate::config::CacheConfig;
use crate::entry::{hash_bytes, CacheBudget, CacheEntry, CacheKey, CacheState};
use crate::error::{CacheError, Result};
use crate::metrics::CacheMetrics;
use bridge_traits::content::AssetPayload;
use bridge_traits::StorageAdapter;
use core_runtime::events::{CacheEvent, CoreEvent};
use core_runtime::EventBus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Wire form of an entry in the backing store.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    mime_type: String,
    content_hash: Option<String>,
    payload: AssetPayload,
}

struct CacheIndex {
    entries: HashMap<CacheKey, CacheEntry>,
    budget: CacheBudget,
    next_seq: u64,
}

/// Capacity-bounded content cache. See the module docs for the concurrency
/// and eviction contract.
pub struct ContentCache {
    config: CacheConfig,
    storage: Arc<dyn StorageAdapter>,
    inner: Mutex<CacheIndex>,
    pinned: parking_lot::Mutex<Option<CacheKey>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    bytes_mirror: AtomicU64,
    entries_mirror: AtomicUsize,
    degraded: AtomicBool,
    event_bus: Option<Arc<EventBus>>,
}

impl ContentCache {
    /// Create a cache over the given backing store.
    pub fn new(config: CacheConfig, storage: Arc<dyn StorageAdapter>) -> Result<Self> {
        config.validate().map_err(CacheError::Config)?;
        let budget = CacheBudget::new(config.max_total_bytes);
        Ok(Self {
            config,
            storage,
            inner: Mutex::new(CacheIndex {
                entries: HashMap::new(),
                budget,
                next_seq: 0,
            }),
            pinned: parking_lot::Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            bytes_mirror: AtomicU64::new(0),
            entries_mirror: AtomicUsize::new(0),
            degraded: AtomicBool::new(false),
            event_bus: None,
        })
    }

    /// Set event bus for cache events.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Look up an entry. Serves from memory only; never fetches.
    ///
    /// A Fresh hit updates the entry's access time. Stale entries are kept
    /// but reported as misses; Corrupt entries (and entries failing the
    /// integrity check) are evicted eagerly and reported as misses.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut inner = self.inner.lock().await;

        enum Disposition {
            Absent,
            Corrupt,
            Stale,
            Hit,
        }

        let disposition = match inner.entries.get(key) {
            None => Disposition::Absent,
            Some(entry) if entry.state == CacheState::Corrupt => Disposition::Corrupt,
            Some(entry) if !entry.integrity_ok(self.config.verify_integrity) => {
                Disposition::Corrupt
            }
            Some(entry) if entry.state == CacheState::Stale => Disposition::Stale,
            Some(_) => Disposition::Hit,
        };

        match disposition {
            Disposition::Absent | Disposition::Stale => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Disposition::Corrupt => {
                warn!(%key, "corrupt cache entry discarded on read");
                if let Some(removed) = inner.entries.remove(key) {
                    inner.budget.release(removed.size_bytes);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    self.sync_mirrors(&inner);
                }
                drop(inner);
                self.delete_persisted(key).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Disposition::Hit => {
                let index = &mut *inner;
                let seq = index.next_seq;
                index.next_seq += 1;
                // Presence was just established; this lookup cannot miss.
                let cloned = index.entries.get_mut(key).map(|entry| {
                    entry.touch(seq);
                    entry.clone()
                });
                self.hits.fetch_add(1, Ordering::Relaxed);
                cloned
            }
        }
    }

    /// `true` when a Fresh entry for `key` is present. Unlike [`get`], this
    /// does not count as an access and does not move the entry's recency.
    ///
    /// [`get`]: ContentCache::get
    pub async fn contains_fresh(&self, key: &CacheKey) -> bool {
        let inner = self.inner.lock().await;
        inner
            .entries
            .get(key)
            .map(|e| e.is_fresh())
            .unwrap_or(false)
    }

    /// Insert an entry, evicting least-recently-accessed non-pinned entries
    /// as needed to fit the budget.
    ///
    /// Fails with [`CacheError::QuotaExceeded`] when the payload alone
    /// exceeds the budget, or when everything evictable has been considered
    /// and the payload still does not fit; existing entries are untouched
    /// in that case.
    #[instrument(skip(self, payload), fields(key = %key))]
    pub async fn put(&self, key: CacheKey, payload: AssetPayload, mime_type: &str) -> Result<()> {
        let size = payload.size_bytes();
        if size > self.config.max_total_bytes {
            return Err(CacheError::QuotaExceeded {
                requested: size,
                budget: self.config.max_total_bytes,
            });
        }
        if payload.is_empty() {
            return Err(CacheError::Corrupt("refusing to cache empty payload".into()));
        }

        let mut inner = self.inner.lock().await;
        let pinned = self.pinned.lock().clone();

        // Replacing an entry frees its bytes as part of the same decision.
        let replaced_size = inner.entries.get(&key).map(|e| e.size_bytes).unwrap_or(0);
        let occupied = inner.budget.current_total_bytes.saturating_sub(replaced_size);

        let mut evicted_keys = Vec::new();
        if occupied + size > self.config.max_total_bytes {
            let needed = occupied + size - self.config.max_total_bytes;
            let victims = plan_evictions(&inner, needed, pinned.as_ref(), Some(&key)).ok_or(
                CacheError::QuotaExceeded {
                    requested: size,
                    budget: self.config.max_total_bytes,
                },
            )?;
            for victim in victims {
                if let Some(removed) = inner.entries.remove(&victim) {
                    inner.budget.release(removed.size_bytes);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %victim, size = removed.size_bytes, "evicted for space");
                    self.emit(CacheEvent::EntryEvicted {
                        key: victim.to_string(),
                        size_bytes: removed.size_bytes,
                    });
                    evicted_keys.push(victim);
                }
            }
        }

        if let Some(old) = inner.entries.remove(&key) {
            inner.budget.release(old.size_bytes);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        let entry = CacheEntry::new(key.clone(), payload, mime_type.to_string(), seq);
        inner.budget.charge(entry.size_bytes);
        inner.entries.insert(key.clone(), entry.clone());
        self.sync_mirrors(&inner);
        drop(inner);

        for victim in &evicted_keys {
            self.delete_persisted(victim).await;
        }
        self.persist(&entry).await;
        self.emit(CacheEvent::EntryCached {
            key: key.to_string(),
            size_bytes: size,
        });
        Ok(())
    }

    /// Evict least-recently-accessed non-pinned entries until `bytes_needed`
    /// of headroom exists. Returns the number of entries evicted.
    pub async fn evict_if_needed(&self, bytes_needed: u64) -> Result<usize> {
        let mut inner = self.inner.lock().await;
        let pinned = self.pinned.lock().clone();

        let headroom = self
            .config
            .max_total_bytes
            .saturating_sub(inner.budget.current_total_bytes);
        if headroom >= bytes_needed {
            return Ok(0);
        }
        let needed = bytes_needed - headroom;

        let victims = plan_evictions(&inner, needed, pinned.as_ref(), None).ok_or(
            CacheError::QuotaExceeded {
                requested: bytes_needed,
                budget: self.config.max_total_bytes,
            },
        )?;

        let mut evicted_keys = Vec::new();
        for victim in victims {
            if let Some(removed) = inner.entries.remove(&victim) {
                inner.budget.release(removed.size_bytes);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                self.emit(CacheEvent::EntryEvicted {
                    key: victim.to_string(),
                    size_bytes: removed.size_bytes,
                });
                evicted_keys.push(victim);
            }
        }
        self.sync_mirrors(&inner);
        drop(inner);

        for victim in &evicted_keys {
            self.delete_persisted(victim).await;
        }
        Ok(evicted_keys.len())
    }

    /// Pin the currently displayed song's key; `None` unpins. Pinned
    /// entries are exempt from eviction. Synchronous so the navigation hot
    /// path can call it before any resolution starts.
    pub fn pin(&self, key: Option<CacheKey>) {
        *self.pinned.lock() = key;
    }

    /// Mark an entry Stale: kept, but served as a miss until refreshed by a
    /// new `put`. Returns `false` when the key is absent.
    pub async fn mark_stale(&self, key: &CacheKey) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.state = CacheState::Stale;
                true
            }
            None => false,
        }
    }

    /// Remove an entry outright. Returns `false` when the key is absent.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.entries.remove(key) {
            Some(removed) => {
                inner.budget.release(removed.size_bytes);
                self.sync_mirrors(&inner);
                drop(inner);
                self.delete_persisted(key).await;
                true
            }
            None => false,
        }
    }

    /// Drop every entry and reset the budget. Counters are preserved.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        let keys: Vec<CacheKey> = inner.entries.keys().cloned().collect();
        inner.entries.clear();
        inner.budget.current_total_bytes = 0;
        self.sync_mirrors(&inner);
        drop(inner);

        for key in &keys {
            self.delete_persisted(key).await;
        }
    }

    /// Repopulate memory from the backing store for the given keys,
    /// typically the current setlist's content at session start. Undecodable
    /// or tampered persisted entries are discarded; a full budget stops the
    /// warm early. Returns the number of entries loaded.
    #[instrument(skip(self, keys))]
    pub async fn warm_from_storage(&self, keys: &[CacheKey]) -> Result<usize> {
        if self.degraded.load(Ordering::SeqCst) {
            return Err(CacheError::StorageUnavailable);
        }

        let mut loaded = 0usize;
        for key in keys {
            if self.contains_fresh(key).await {
                continue;
            }

            let raw = match self.storage.read(&key.storage_key()).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) if e.is_unavailable() => {
                    self.degrade();
                    return Err(CacheError::StorageUnavailable);
                }
                Err(e) => {
                    warn!(%key, error = %e, "failed to read persisted entry");
                    continue;
                }
            };

            let stored: StoredEntry = match serde_json::from_slice(&raw) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!(%key, error = %e, "discarding undecodable persisted entry");
                    self.delete_persisted(key).await;
                    continue;
                }
            };

            if let (AssetPayload::Blob(data), Some(expected)) =
                (&stored.payload, &stored.content_hash)
            {
                if hash_bytes(data) != *expected {
                    warn!(%key, "discarding tampered persisted entry");
                    self.delete_persisted(key).await;
                    continue;
                }
            }

            match self
                .put(key.clone(), stored.payload, &stored.mime_type)
                .await
            {
                Ok(()) => loaded += 1,
                Err(CacheError::QuotaExceeded { .. }) => {
                    debug!("cache budget full, stopping warm");
                    break;
                }
                Err(e) => {
                    warn!(%key, error = %e, "failed to warm entry");
                }
            }
        }

        if let Ok(used) = self.storage.used_bytes().await {
            debug!(loaded, storage_used_bytes = used, "cache warm complete");
        }
        Ok(loaded)
    }

    /// Point-in-time metrics snapshot. Synchronous; reads mirrored
    /// counters, never the index lock.
    pub fn metrics(&self) -> CacheMetrics {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        CacheMetrics {
            hit_count: hits,
            miss_count: misses,
            hit_rate: CacheMetrics::compute_hit_rate(hits, misses),
            current_total_bytes: self.bytes_mirror.load(Ordering::Relaxed),
            max_total_bytes: self.config.max_total_bytes,
            entry_count: self.entries_mirror.load(Ordering::Relaxed),
            eviction_count: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// `true` once the backing store has failed and the cache is running
    /// memory-only.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    fn sync_mirrors(&self, inner: &CacheIndex) {
        self.bytes_mirror
            .store(inner.budget.current_total_bytes, Ordering::Relaxed);
        self.entries_mirror
            .store(inner.entries.len(), Ordering::Relaxed);
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Cache(event));
        }
    }

    /// Flip into memory-only mode. Logged and emitted once per session.
    fn degrade(&self) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!("cache backing store unavailable, continuing memory-only");
            self.emit(CacheEvent::StorageDegraded);
        }
    }

    async fn persist(&self, entry: &CacheEntry) {
        if !self.config.persist_payloads || self.degraded.load(Ordering::SeqCst) {
            return;
        }
        // URL payloads re-resolve cheaply; only blobs are worth persisting.
        if !matches!(entry.payload, AssetPayload::Blob(_)) {
            return;
        }

        let stored = StoredEntry {
            mime_type: entry.mime_type.clone(),
            content_hash: entry.content_hash.clone(),
            payload: entry.payload.clone(),
        };
        let raw = match serde_json::to_vec(&stored) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %entry.key, error = %e, "failed to encode entry for persistence");
                return;
            }
        };

        match self.storage.write(&entry.key.storage_key(), raw.into()).await {
            Ok(()) => {}
            Err(e) if e.is_unavailable() => self.degrade(),
            Err(e) => warn!(key = %entry.key, error = %e, "cache write-through failed"),
        }
    }

    async fn delete_persisted(&self, key: &CacheKey) {
        if !self.config.persist_payloads || self.degraded.load(Ordering::SeqCst) {
            return;
        }
        match self.storage.delete(&key.storage_key()).await {
            Ok(()) => {}
            Err(e) if e.is_unavailable() => self.degrade(),
            Err(e) => debug!(%key, error = %e, "failed to delete persisted entry"),
        }
    }
}

/// Choose eviction victims: least-recently-accessed first, ties broken by
/// insertion order; the pinned key and the key being written are exempt.
/// Returns `None` when even evicting every candidate cannot free `needed`
/// bytes.
fn plan_evictions(
    inner: &CacheIndex,
    needed: u64,
    pinned: Option<&CacheKey>,
    inserting: Option<&CacheKey>,
) -> Option<Vec<CacheKey>> {
    let mut candidates: Vec<&CacheEntry> = inner
        .entries
        .values()
        .filter(|e| Some(&e.key) != pinned && Some(&e.key) != inserting)
        .collect();
    candidates.sort_by_key(|e| (e.last_access_seq, e.insert_seq));

    let mut victims = Vec::new();
    let mut freed = 0u64;
    for entry in candidates {
        if freed >= needed {
            break;
        }
        victims.push(entry.key.clone());
        freed += entry.size_bytes;
    }

    if freed >= needed {
        Some(victims)
    } else {
        None
    }
}
