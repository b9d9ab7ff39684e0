use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The collaborator is down or unreachable; callers should degrade rather
    /// than retry per call.
    #[error("Collaborator unavailable: {0}")]
    NotAvailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    /// A position batch was only partially applied. `applied` entries were
    /// written before the first failure; `failed` pairs each rejected entry id
    /// with the store's reason.
    #[error("Position batch partially applied: {applied} written, {} rejected", .failed.len())]
    PartialBatch {
        applied: usize,
        failed: Vec<(String, String)>,
    },

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` if the collaborator itself is down (as opposed to a
    /// per-request failure).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BridgeError::NotAvailable(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
