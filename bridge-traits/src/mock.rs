//! In-memory collaborator fakes for testing.
//!
//! These fakes back consumer tests without a filesystem, database, or
//! network. They are compiled only with the `test-util` feature, alongside
//! the `mockall` automocks generated for each trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::content::{AssetPayload, ContentResolver, ResolvedAsset};
use crate::error::{BridgeError, Result};
use crate::setlist::{PositionUpdate, SetlistStore};
use crate::storage::StorageAdapter;

// ============================================================================
// Storage
// ============================================================================

/// In-memory [`StorageAdapter`].
///
/// Blobs live in a `HashMap` behind an async `RwLock`, so all trait methods
/// operate on `&self`. Flipping `set_available(false)` makes every call fail
/// with [`BridgeError::NotAvailable`], which is how tests exercise the
/// cache's memory-only degradation path.
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Bytes>>,
    available: AtomicBool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going down (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Keys currently held, for assertions.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BridgeError::NotAvailable("memory storage offline".into()))
        }
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<Bytes>> {
        self.check_available()?;
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<()> {
        self.check_available()?;
        self.blobs.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.blobs.write().await.remove(key);
        Ok(())
    }

    async fn used_bytes(&self) -> Result<u64> {
        self.check_available()?;
        let blobs = self.blobs.read().await;
        Ok(blobs.values().map(|b| b.len() as u64).sum())
    }
}

// ============================================================================
// Setlist persistence
// ============================================================================

/// A batch as received by [`MemorySetlistStore`], for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBatch {
    pub setlist_id: String,
    pub updates: Vec<PositionUpdate>,
}

/// In-memory [`SetlistStore`] that enforces position uniqueness per setlist,
/// the constraint the two-phase renumbering protocol exists to work around.
///
/// A single-phase renumber that swaps two rows would trip the uniqueness
/// check here exactly as it would against the real database. Tests can also
/// inject a hard failure after N applied updates to exercise partial-batch
/// recovery.
#[derive(Default)]
pub struct MemorySetlistStore {
    positions: Mutex<HashMap<String, HashMap<String, u32>>>,
    batches: Mutex<Vec<RecordedBatch>>,
    fail_after_updates: Mutex<Option<usize>>,
    applied_updates: Mutex<usize>,
}

impl MemorySetlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a setlist's current positions.
    pub fn seed(&self, setlist_id: &str, entries: &[(&str, u32)]) {
        let mut positions = self.positions.lock().unwrap();
        let setlist = positions.entry(setlist_id.to_string()).or_default();
        for (entry_id, position) in entries {
            setlist.insert((*entry_id).to_string(), *position);
        }
    }

    /// Make the store fail hard once `n` more individual updates have been
    /// applied (across batches).
    pub fn fail_after_updates(&self, n: usize) {
        *self.fail_after_updates.lock().unwrap() = Some(n);
        *self.applied_updates.lock().unwrap() = 0;
    }

    /// Every batch received so far, in order.
    pub fn recorded_batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().unwrap().clone()
    }

    /// Delete one entry's row, as the application CRUD layer would before
    /// the engine renumbers the survivors.
    pub fn remove_row(&self, setlist_id: &str, entry_id: &str) {
        if let Some(setlist) = self.positions.lock().unwrap().get_mut(setlist_id) {
            setlist.remove(entry_id);
        }
    }

    /// Current position of one entry, for assertions.
    pub fn position_of(&self, setlist_id: &str, entry_id: &str) -> Option<u32> {
        self.positions
            .lock()
            .unwrap()
            .get(setlist_id)
            .and_then(|s| s.get(entry_id).copied())
    }
}

#[async_trait]
impl SetlistStore for MemorySetlistStore {
    async fn batch_update_positions(
        &self,
        setlist_id: &str,
        updates: &[PositionUpdate],
    ) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        self.batches.lock().unwrap().push(RecordedBatch {
            setlist_id: setlist_id.to_string(),
            updates: updates.to_vec(),
        });

        let mut positions = self.positions.lock().unwrap();
        let setlist = positions.entry(setlist_id.to_string()).or_default();

        let fail_after = *self.fail_after_updates.lock().unwrap();
        let mut applied = 0usize;
        let mut failed: Vec<(String, String)> = Vec::new();

        for (i, update) in updates.iter().enumerate() {
            if let Some(limit) = fail_after {
                let mut total = self.applied_updates.lock().unwrap();
                if *total >= limit {
                    failed.push((update.entry_id.clone(), "store failure injected".into()));
                    failed.extend(
                        updates[i + 1..]
                            .iter()
                            .map(|u| (u.entry_id.clone(), "not attempted".into())),
                    );
                    return Err(BridgeError::PartialBatch { applied, failed });
                }
                *total += 1;
            }

            let conflict = setlist
                .iter()
                .any(|(id, pos)| *pos == update.position && *id != update.entry_id);
            if conflict {
                failed.push((
                    update.entry_id.clone(),
                    format!("position {} already taken", update.position),
                ));
                failed.extend(
                    updates[i + 1..]
                        .iter()
                        .map(|u| (u.entry_id.clone(), "not attempted".into())),
                );
                return Err(BridgeError::PartialBatch { applied, failed });
            }

            match setlist.get_mut(&update.entry_id) {
                Some(pos) => *pos = update.position,
                None => {
                    failed.push((update.entry_id.clone(), "unknown entry".into()));
                    failed.extend(
                        updates[i + 1..]
                            .iter()
                            .map(|u| (u.entry_id.clone(), "not attempted".into())),
                    );
                    return Err(BridgeError::PartialBatch { applied, failed });
                }
            }
            applied += 1;
        }

        Ok(())
    }
}

// ============================================================================
// Content resolution
// ============================================================================

/// Scripted [`ContentResolver`] with per-call delay and call recording.
///
/// `mockall` expectations cover "was it called" assertions; this fake covers
/// the timing-sensitive cases (an artificially slow remote) and multi-call
/// sequences where writing expectations would be noisier than scripting.
#[derive(Default)]
pub struct ScriptedResolver {
    assets: Mutex<HashMap<String, ResolvedAsset>>,
    failing: Mutex<HashMap<String, String>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful resolution for `content_id`.
    pub fn with_asset(self, content_id: &str, payload: AssetPayload, mime_type: &str) -> Self {
        self.assets.lock().unwrap().insert(
            content_id.to_string(),
            ResolvedAsset {
                payload,
                mime_type: mime_type.to_string(),
            },
        );
        self
    }

    /// Script a network failure for `content_id`.
    pub fn with_failure(self, content_id: &str, reason: &str) -> Self {
        self.failing
            .lock()
            .unwrap()
            .insert(content_id.to_string(), reason.to_string());
        self
    }

    /// Delay every resolution, simulating a slow remote.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    /// Content ids resolved so far, in call order.
    pub fn resolved_ids(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentResolver for ScriptedResolver {
    async fn resolve_asset(&self, content_id: &str) -> Result<ResolvedAsset> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().unwrap().push(content_id.to_string());

        if let Some(reason) = self.failing.lock().unwrap().get(content_id) {
            return Err(BridgeError::Network(reason.clone()));
        }
        self.assets
            .lock()
            .unwrap()
            .get(content_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(content_id.to_string()))
    }
}
