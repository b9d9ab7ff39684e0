//! Position manager: executes reorder plans against the setlist store.
//!
//! The planning itself is pure ([`crate::position`]); this module owns the
//! two-phase persistence protocol. Phase one parks changed entries at
//! temporary positions, phase two writes the final values. A failure in
//! phase one aborts before phase two runs, so no partial renumbering of the
//! real range ever becomes visible; a failure in phase two leaves some
//! entries parked, which [`PositionManager::heal`] repairs on next read.

use crate::error::{Result, SetlistError};
use crate::models::{EntryId, Setlist, SetlistEntry};
use crate::position::{self, ReorderPlan};
use bridge_traits::SetlistStore;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Maintains the gap-free 1-based ordering of songs within a setlist.
pub struct PositionManager {
    store: Arc<dyn SetlistStore>,
}

impl PositionManager {
    pub fn new(store: Arc<dyn SetlistStore>) -> Self {
        Self { store }
    }

    /// Move an entry to `target_position` and persist the new ordering.
    ///
    /// Returns the reordered setlist. A move to the entry's current
    /// position returns the input unchanged without touching the store.
    #[instrument(skip(self, setlist), fields(setlist_id = %setlist.id))]
    pub async fn reorder(
        &self,
        setlist: &Setlist,
        moving_id: &EntryId,
        target_position: u32,
    ) -> Result<Setlist> {
        let plan = position::plan_reorder(&setlist.entries, moving_id, target_position)?;
        self.execute(setlist, plan).await
    }

    /// Renumber the setlist's displaced entries and persist; the new row
    /// itself is persisted by the caller afterwards, at the position it
    /// carries in the returned setlist.
    #[instrument(skip(self, setlist, entry), fields(setlist_id = %setlist.id))]
    pub async fn insert_entry(
        &self,
        setlist: &Setlist,
        entry: SetlistEntry,
        target_position: u32,
    ) -> Result<Setlist> {
        let plan = position::plan_insert(&setlist.entries, entry, target_position);
        self.execute(setlist, plan).await
    }

    /// Renumber the survivors of a removal and persist; the caller must
    /// have deleted the removed row already.
    #[instrument(skip(self, setlist), fields(setlist_id = %setlist.id))]
    pub async fn remove_entry(&self, setlist: &Setlist, removing_id: &EntryId) -> Result<Setlist> {
        let plan = position::plan_remove(&setlist.entries, removing_id)?;
        self.execute(setlist, plan).await
    }

    /// Restore the `1..=N` invariant for a setlist whose positions are
    /// stale (e.g. entries parked at temporary positions after a partial
    /// phase-two batch). No-op for a contiguous setlist.
    #[instrument(skip(self, setlist), fields(setlist_id = %setlist.id))]
    pub async fn heal(&self, setlist: &Setlist) -> Result<Setlist> {
        if setlist.is_contiguous() {
            return Ok(setlist.clone());
        }
        warn!("setlist positions are stale, renumbering");
        let plan = position::plan_renumber(&setlist.entries);
        self.execute(setlist, plan).await
    }

    async fn execute(&self, setlist: &Setlist, plan: ReorderPlan) -> Result<Setlist> {
        if plan.is_noop() {
            debug!("ordering unchanged, skipping persistence");
            return Ok(rebuilt(setlist, plan));
        }

        let setlist_id = setlist.id.to_string();

        // Phase one must fully succeed before any final position is
        // written; a partial phase one leaves only parked entries behind,
        // which heal() recovers.
        self.store
            .batch_update_positions(&setlist_id, &plan.phase_one)
            .await
            .map_err(SetlistError::from)?;

        self.store
            .batch_update_positions(&setlist_id, &plan.phase_two)
            .await
            .map_err(SetlistError::from)?;

        debug!(
            updated = plan.phase_two.len(),
            total = plan.entries.len(),
            "positions persisted"
        );
        Ok(rebuilt(setlist, plan))
    }
}

fn rebuilt(setlist: &Setlist, plan: ReorderPlan) -> Setlist {
    Setlist {
        id: setlist.id,
        name: setlist.name.clone(),
        entries: plan.entries,
    }
}
