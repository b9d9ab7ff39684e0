//! Position planning for setlist reordering.
//!
//! Pure, synchronous algorithms: given the current entries and a mutation
//! (move, insert, remove, renumber), compute the final ordering plus the
//! two-phase persistence batches that get there without ever violating the
//! store's per-setlist position uniqueness constraint.
//!
//! Phase one parks every entry whose position changes at a temporary
//! position above `max_position + TEMP_POSITION_OFFSET`; phase two writes
//! the final sequential values. Both batches contain only entries whose
//! position actually differs from before, which is what makes a repeated
//! identical reorder a no-op write.

use crate::error::{Result, SetlistError};
use crate::models::{EntryId, SetlistEntry};
use bridge_traits::setlist::PositionUpdate;

/// Gap between the highest real position and the temporary parking range.
pub const TEMP_POSITION_OFFSET: u32 = 1000;

/// The outcome of planning a setlist mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Final entries, sorted and renumbered `1..=N`.
    pub entries: Vec<SetlistEntry>,
    /// Phase-one batch: changed entries parked at temporary positions.
    pub phase_one: Vec<PositionUpdate>,
    /// Phase-two batch: changed entries at their final positions.
    pub phase_two: Vec<PositionUpdate>,
}

impl ReorderPlan {
    /// `true` when no entry's position changes and persistence can be
    /// skipped entirely.
    pub fn is_noop(&self) -> bool {
        self.phase_two.is_empty()
    }
}

/// Plan moving `moving_id` to `target_position` (1-based).
///
/// The target is clamped into `1..=N`; out-of-range requests are valid input
/// from a UI mid-drag, not errors. Moving an entry to its current position
/// yields a no-op plan. Unknown `moving_id` fails with
/// [`SetlistError::NotFound`].
pub fn plan_reorder(
    entries: &[SetlistEntry],
    moving_id: &EntryId,
    target_position: u32,
) -> Result<ReorderPlan> {
    let moving_index = entries
        .iter()
        .position(|e| e.id == *moving_id)
        .ok_or_else(|| SetlistError::NotFound {
            entity_type: "SetlistEntry".to_string(),
            id: moving_id.to_string(),
        })?;

    let count = entries.len();
    let mut reordered: Vec<SetlistEntry> = entries.to_vec();
    let moving = reordered.remove(moving_index);

    // Clamp into 1..=N, then shift to an insertion index in the shortened
    // list. Removing the moving entry first means the index needs no
    // further adjustment for moves in either direction.
    let target = target_position.clamp(1, count as u32) as usize;
    let insert_at = (target - 1).min(reordered.len());
    reordered.insert(insert_at, moving);

    Ok(plan_from(entries, reordered))
}

/// Plan a full renumbering of `entries` to `1..=N` in their current order.
///
/// This is the self-heal path after a partial phase-two batch left some
/// entries parked at temporary positions: sorting by the stored positions
/// preserves the intended order (parked entries sort last in phase order),
/// and renumbering restores the invariant. Already-contiguous input yields
/// a no-op plan.
pub fn plan_renumber(entries: &[SetlistEntry]) -> ReorderPlan {
    let mut reordered: Vec<SetlistEntry> = entries.to_vec();
    reordered.sort_by_key(|e| e.position);
    plan_from(entries, reordered)
}

/// Plan inserting `entry` at `position` (clamped into `1..=N+1`).
///
/// The returned batches renumber only the pre-existing entries the insert
/// displaces; the new row itself is persisted by the caller's CRUD layer
/// *after* the batches run, at the position it carries in `plan.entries`.
pub fn plan_insert(entries: &[SetlistEntry], entry: SetlistEntry, position: u32) -> ReorderPlan {
    let mut reordered: Vec<SetlistEntry> = entries.to_vec();
    let target = position.clamp(1, entries.len() as u32 + 1) as usize;
    reordered.insert(target - 1, entry);
    plan_from(entries, reordered)
}

/// Plan removing the entry `removing_id`.
///
/// The caller's CRUD layer must delete the row *before* the batches run so
/// its position is free for the survivors shifting up. Unknown ids fail
/// with [`SetlistError::NotFound`].
pub fn plan_remove(entries: &[SetlistEntry], removing_id: &EntryId) -> Result<ReorderPlan> {
    let index = entries
        .iter()
        .position(|e| e.id == *removing_id)
        .ok_or_else(|| SetlistError::NotFound {
            entity_type: "SetlistEntry".to_string(),
            id: removing_id.to_string(),
        })?;

    let mut reordered: Vec<SetlistEntry> = entries.to_vec();
    reordered.remove(index);
    Ok(plan_from(entries, reordered))
}

/// Diff `reordered` (final order) against `original` (stored positions) into
/// a renumbered entry list plus the two persistence batches.
fn plan_from(original: &[SetlistEntry], reordered: Vec<SetlistEntry>) -> ReorderPlan {
    let max_position = original.iter().map(|e| e.position).max().unwrap_or(0);
    let temp_base = max_position + TEMP_POSITION_OFFSET;

    let mut entries = reordered;
    let mut phase_one = Vec::new();
    let mut phase_two = Vec::new();

    for (index, entry) in entries.iter_mut().enumerate() {
        let final_position = (index + 1) as u32;
        let previous = original
            .iter()
            .find(|o| o.id == entry.id)
            .map(|o| o.position);

        entry.position = final_position;

        // Entries not present in `original` are new rows; the caller
        // persists them directly and they never enter the batches.
        if previous.is_some() && previous != Some(final_position) {
            let offset = phase_one.len() as u32;
            phase_one.push(PositionUpdate::new(
                entry.id.to_string(),
                temp_base + offset,
            ));
            phase_two.push(PositionUpdate::new(entry.id.to_string(), final_position));
        }
    }

    ReorderPlan {
        entries,
        phase_one,
        phase_two,
    }
}
