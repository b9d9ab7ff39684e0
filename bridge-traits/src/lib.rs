//! # Collaborator Bridge Traits
//!
//! Interfaces the performance engine consumes but does not implement.
//!
//! ## Overview
//!
//! The engine is a pure in-process core: it owns no wire protocol, file
//! format, or database schema. Everything that touches the outside world is
//! expressed as a trait here and injected by the host application (desktop
//! app, mobile shell, test harness).
//!
//! ## Traits
//!
//! - [`StorageAdapter`](storage::StorageAdapter) - Persistent key/blob store
//!   backing the offline content cache
//! - [`ContentResolver`](content::ContentResolver) - Remote resolution of a
//!   content id into a playable asset
//! - [`SetlistStore`](setlist::SetlistStore) - Batched position updates
//!   against the canonical setlist records, with partial-failure reporting
//!
//! ## Degradation Contract
//!
//! Collaborators are allowed to be unavailable. The engine must keep
//! functioning when they are:
//!
//! - `StorageAdapter` down → the cache runs memory-only for the session
//! - `ContentResolver` down → navigation falls back to cached or inline
//!   content, then to a placeholder for the affected song only
//!
//! ## Test Utilities
//!
//! With the `test-util` feature, this crate additionally ships `mockall`
//! automocks for every trait plus in-memory fakes ([`mock::MemoryStorage`],
//! [`mock::MemorySetlistStore`], [`mock::ScriptedResolver`]) for tests that
//! need realistic stateful behavior rather than expectations.

pub mod content;
pub mod error;
pub mod setlist;
pub mod storage;

#[cfg(feature = "test-util")]
pub mod mock;

pub use content::{AssetPayload, ContentResolver, ResolvedAsset};
pub use error::{BridgeError, Result};
pub use setlist::{PositionUpdate, SetlistStore};
pub use storage::StorageAdapter;

#[cfg(feature = "test-util")]
pub use content::MockContentResolver;
#[cfg(feature = "test-util")]
pub use setlist::MockSetlistStore;
#[cfg(feature = "test-util")]
pub use storage::MockStorageAdapter;
