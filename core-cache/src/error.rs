//! Cache error types

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors surfaced by cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid cache configuration.
    #[error("Invalid cache configuration: {0}")]
    Config(String),

    /// The payload cannot fit, either because it alone exceeds the budget
    /// or because every remaining entry is exempt from eviction.
    #[error("Cache quota exceeded: {requested} bytes requested, {budget} byte budget")]
    QuotaExceeded { requested: u64, budget: u64 },

    /// The backing store is down. The cache keeps operating memory-only;
    /// this only surfaces from operations that exist purely to touch the
    /// store (e.g. warming from persisted entries).
    #[error("Cache storage unavailable")]
    StorageUnavailable,

    /// A payload that no renderer could display, or a persisted entry that
    /// failed to decode.
    #[error("Corrupt cache payload: {0}")]
    Corrupt(String),

    /// Underlying collaborator failure.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, CacheError>;
