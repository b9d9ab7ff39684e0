use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetlistError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    /// A position batch was only partially applied. Some entries are parked
    /// at temporary positions; the setlist is stale, not corrupt, and a full
    /// renumbering on next read restores the invariant.
    #[error("Position batch conflict: {applied} applied, {} failed", .failed.len())]
    PositionConflict {
        applied: usize,
        failed: Vec<(String, String)>,
    },

    #[error("Store error: {0}")]
    Store(BridgeError),
}

impl From<BridgeError> for SetlistError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::PartialBatch { applied, failed } => {
                SetlistError::PositionConflict { applied, failed }
            }
            other => SetlistError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SetlistError>;
