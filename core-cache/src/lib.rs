//! # Offline Content Cache Module
//!
//! Capacity-bounded local store for performance assets.
//!
//! ## Overview
//!
//! The cache keeps the assets a performer needs next available instantly,
//! with or without network:
//! - Byte-budgeted, with least-recently-accessed eviction
//! - Pinned-key exemption so the currently displayed song is never evicted
//! - Integrity verification with SHA-256 hashes, corrupt entries served as
//!   misses and discarded eagerly
//! - Write-through persistence over a [`StorageAdapter`], degrading to
//!   memory-only for the session when the store is unavailable
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     ContentCache                       │
//! │  - get() / put() / pin()               │
//! │  - evict_if_needed()                   │
//! │  - warm_from_storage()                 │
//! │  - metrics()                           │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> StorageAdapter (persistence)
//!          └──> EventBus (optional, cache events)
//! ```
//!
//! [`StorageAdapter`]: bridge_traits::StorageAdapter

pub mod config;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod store;

pub use config::CacheConfig;
pub use entry::{AssetVariant, CacheBudget, CacheEntry, CacheKey, CacheState};
pub use error::{CacheError, Result};
pub use metrics::CacheMetrics;
pub use store::ContentCache;
