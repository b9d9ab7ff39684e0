//! Setlist Persistence Abstraction
//!
//! The canonical setlist records live in an external data store (the
//! application database). The ordering engine only needs one operation from
//! it: batched position updates with partial-failure reporting, the primitive
//! the two-phase renumbering protocol is built on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One entry's new position within its setlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub entry_id: String,
    pub position: u32,
}

impl PositionUpdate {
    pub fn new(entry_id: impl Into<String>, position: u32) -> Self {
        Self {
            entry_id: entry_id.into(),
            position,
        }
    }
}

/// Setlist persistence collaborator.
///
/// The backing store enforces position uniqueness per setlist, so a batch
/// may fail partway through. Implementations must report partial application
/// via [`BridgeError::PartialBatch`](crate::error::BridgeError::PartialBatch)
/// so the caller can distinguish "nothing happened" from "some rows moved".
#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait SetlistStore: Send + Sync {
    /// Apply a batch of position updates to one setlist.
    ///
    /// An empty batch must succeed without touching the store.
    async fn batch_update_positions(
        &self,
        setlist_id: &str,
        updates: &[PositionUpdate],
    ) -> Result<()>;
}
