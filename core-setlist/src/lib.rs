//! # Setlist Ordering Module
//!
//! Domain model and ordering engine for performance setlists.
//!
//! ## Overview
//!
//! This crate owns the one real invariant of setlist management: entry
//! positions within a setlist are always a contiguous `1..=N`, with no
//! duplicates or gaps, for every reader, across any sequence of moves,
//! inserts, and removals.
//!
//! Because the backing store enforces position uniqueness per setlist, a
//! naive in-place renumbering can collide with itself. Persistence therefore
//! runs as a two-phase protocol: changed entries are parked in a temporary
//! high range first, then written to their final sequential values. See
//! [`position`] for the planning algorithms and [`ordering`] for execution
//! and partial-failure recovery.

pub mod error;
pub mod models;
pub mod ordering;
pub mod position;

pub use error::{Result, SetlistError};
pub use models::{ContentId, ContentSummary, EntryId, InlineContent, Setlist, SetlistEntry, SetlistId};
pub use ordering::PositionManager;
pub use position::{ReorderPlan, TEMP_POSITION_OFFSET};
