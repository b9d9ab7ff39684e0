//! # Performance Mode Module
//!
//! The engine a performer drives during a live show: prefetching around the
//! current song and navigating the set with immediate feedback, online or
//! offline.
//!
//! ## Overview
//!
//! - [`PerformanceSession`](session::PerformanceSession): the navigation
//!   state machine. `next`/`prev`/`jump_to` update index and metadata
//!   synchronously, then resolve the content pane asynchronously through
//!   the fallback chain cache → remote → inline → placeholder.
//! - [`Prefetcher`](prefetch::Prefetcher): best-effort cache warming for
//!   the songs adjacent to the current one, with stale-window discard.
//! - [`PerformanceEngine`](engine::PerformanceEngine): assembles the whole
//!   engine (cache, prefetcher, session, position manager) from an
//!   [`EngineConfig`](core_runtime::EngineConfig).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ PerformanceSession                          │
//! │  next()/prev()/jump_to() ── sync state ──┐  │
//! │                                          │  │
//! │  ResolutionTask (async, generation-gated)│  │
//! └───────┬──────────────────┬───────────────┼──┘
//!         │                  │               │
//!         v                  v               v
//!   ContentCache      ContentResolver    Prefetcher
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod prefetch;
pub mod session;
pub mod state;

pub use config::PrefetchConfig;
pub use engine::PerformanceEngine;
pub use error::{PerformanceError, Result};
pub use prefetch::Prefetcher;
pub use session::PerformanceSession;
pub use state::{NavStatus, NavigationState, ResolvedContent};
