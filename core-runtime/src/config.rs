//! # Engine Configuration
//!
//! Builder for the dependencies and settings the performance engine needs.
//!
//! ## Overview
//!
//! The engine is assembled from three injected collaborators (storage,
//! content resolution, setlist persistence) plus a handful of tunables. The
//! builder enforces fail-fast validation: a missing collaborator or a
//! nonsensical setting is reported at construction time with an actionable
//! message, never as a latent runtime panic.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::EngineConfig;
//! use std::sync::Arc;
//!
//! let config = EngineConfig::builder()
//!     .storage(Arc::new(MyStorage))
//!     .resolver(Arc::new(MyResolver))
//!     .setlist_store(Arc::new(MyStore))
//!     .max_cache_bytes(256 * 1024 * 1024)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{ContentResolver, SetlistStore, StorageAdapter};
use std::sync::Arc;

/// Default cache budget: 512 MiB.
pub const DEFAULT_MAX_CACHE_BYTES: u64 = 512 * 1024 * 1024;

/// Default prefetch window, as offsets from the current index.
///
/// One song behind, two ahead. Chosen empirically; a tunable, not a
/// contract.
pub const DEFAULT_PREFETCH_OFFSETS: [i64; 3] = [-1, 1, 2];

/// Assembled engine configuration.
///
/// Use [`EngineConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct EngineConfig {
    /// Persistent backing store for the content cache.
    pub storage: Arc<dyn StorageAdapter>,

    /// Remote content-resolution collaborator.
    pub resolver: Arc<dyn ContentResolver>,

    /// Setlist persistence collaborator.
    pub setlist_store: Arc<dyn SetlistStore>,

    /// Maximum total bytes the content cache may hold.
    pub max_cache_bytes: u64,

    /// Verify cached payload hashes on read.
    pub verify_integrity: bool,

    /// Prefetch window as index offsets from the current song.
    pub prefetch_offsets: Vec<i64>,

    /// Event bus buffer capacity.
    pub event_capacity: usize,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("storage", &"<dyn StorageAdapter>")
            .field("resolver", &"<dyn ContentResolver>")
            .field("setlist_store", &"<dyn SetlistStore>")
            .field("max_cache_bytes", &self.max_cache_bytes)
            .field("verify_integrity", &self.verify_integrity)
            .field("prefetch_offsets", &self.prefetch_offsets)
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

impl EngineConfig {
    /// Start building a configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Default)]
pub struct EngineConfigBuilder {
    storage: Option<Arc<dyn StorageAdapter>>,
    resolver: Option<Arc<dyn ContentResolver>>,
    setlist_store: Option<Arc<dyn SetlistStore>>,
    max_cache_bytes: Option<u64>,
    verify_integrity: Option<bool>,
    prefetch_offsets: Option<Vec<i64>>,
    event_capacity: Option<usize>,
}

impl EngineConfigBuilder {
    pub fn storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn ContentResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn setlist_store(mut self, store: Arc<dyn SetlistStore>) -> Self {
        self.setlist_store = Some(store);
        self
    }

    pub fn max_cache_bytes(mut self, bytes: u64) -> Self {
        self.max_cache_bytes = Some(bytes);
        self
    }

    pub fn verify_integrity(mut self, verify: bool) -> Self {
        self.verify_integrity = Some(verify);
        self
    }

    pub fn prefetch_offsets(mut self, offsets: Vec<i64>) -> Self {
        self.prefetch_offsets = Some(offsets);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<EngineConfig> {
        let storage = self.storage.ok_or_else(|| Error::CapabilityMissing {
            capability: "StorageAdapter".to_string(),
            message: "No storage adapter provided. Inject the host's local \
                      store, or a MemoryStorage fake in tests."
                .to_string(),
        })?;
        let resolver = self.resolver.ok_or_else(|| Error::CapabilityMissing {
            capability: "ContentResolver".to_string(),
            message: "No content resolver provided. Inject the host's content \
                      service client."
                .to_string(),
        })?;
        let setlist_store = self.setlist_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SetlistStore".to_string(),
            message: "No setlist store provided. Inject the host's setlist \
                      persistence adapter."
                .to_string(),
        })?;

        let max_cache_bytes = self.max_cache_bytes.unwrap_or(DEFAULT_MAX_CACHE_BYTES);
        if max_cache_bytes == 0 {
            return Err(Error::Config(
                "max_cache_bytes must be greater than 0".to_string(),
            ));
        }

        let prefetch_offsets = self
            .prefetch_offsets
            .unwrap_or_else(|| DEFAULT_PREFETCH_OFFSETS.to_vec());
        if prefetch_offsets.contains(&0) {
            return Err(Error::Config(
                "prefetch_offsets must not include 0; the current song is \
                 resolved by navigation, not prefetch"
                    .to_string(),
            ));
        }

        let event_capacity = self.event_capacity.unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE);
        if event_capacity == 0 {
            return Err(Error::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }

        Ok(EngineConfig {
            storage,
            resolver,
            setlist_store,
            max_cache_bytes,
            verify_integrity: self.verify_integrity.unwrap_or(true),
            prefetch_offsets,
            event_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::mock::{MemorySetlistStore, MemoryStorage, ScriptedResolver};

    fn full_builder() -> EngineConfigBuilder {
        EngineConfig::builder()
            .storage(Arc::new(MemoryStorage::new()))
            .resolver(Arc::new(ScriptedResolver::new()))
            .setlist_store(Arc::new(MemorySetlistStore::new()))
    }

    #[test]
    fn builds_with_defaults() {
        let config = full_builder().build().unwrap();
        assert_eq!(config.max_cache_bytes, DEFAULT_MAX_CACHE_BYTES);
        assert_eq!(config.prefetch_offsets, DEFAULT_PREFETCH_OFFSETS.to_vec());
        assert!(config.verify_integrity);
    }

    #[test]
    fn missing_collaborators_fail_fast() {
        let err = EngineConfig::builder().build().unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { ref capability, .. }
            if capability == "StorageAdapter"));

        let err = EngineConfig::builder()
            .storage(Arc::new(MemoryStorage::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { ref capability, .. }
            if capability == "ContentResolver"));
    }

    #[test]
    fn rejects_zero_budget_and_zero_offset() {
        assert!(full_builder().max_cache_bytes(0).build().is_err());
        assert!(full_builder().prefetch_offsets(vec![0, 1]).build().is_err());
    }
}
