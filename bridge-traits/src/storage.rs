//! Local Storage Abstraction
//!
//! Provides a platform-agnostic trait for the persistent key-value store that
//! backs the offline content cache. Implementations range from a directory of
//! files on desktop to IndexedDB on the web; the cache only ever sees opaque
//! keys and byte blobs.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Persistent backing store for cached assets.
///
/// All operations are fallible: an implementation is allowed to be
/// unavailable for the whole session (device storage full, private browsing
/// mode, missing permissions). Consumers must treat
/// [`BridgeError::NotAvailable`](crate::error::BridgeError::NotAvailable) as
/// a signal to degrade to memory-only operation, not as something to retry
/// on every call.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::StorageAdapter;
///
/// async fn persist(storage: &dyn StorageAdapter, key: &str, data: bytes::Bytes) {
///     if let Err(e) = storage.write(key, data).await {
///         tracing::warn!("storage write failed: {e}");
///     }
/// }
/// ```
#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Read a previously written blob. `Ok(None)` means the key is absent.
    async fn read(&self, key: &str) -> Result<Option<Bytes>>;

    /// Write a blob under `key`, replacing any existing value.
    async fn write(&self, key: &str, data: Bytes) -> Result<()>;

    /// Delete the blob under `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Total bytes currently held by this store.
    async fn used_bytes(&self) -> Result<u64>;
}
