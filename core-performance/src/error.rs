use thiserror::Error;

/// Errors internal to performance-mode resolution.
///
/// These never escape the session's public navigation API: a song whose
/// resolution fails is shown as a placeholder (`NavStatus::Failed`) and the
/// failure is broadcast as an event, while navigation to every other song
/// keeps working.
#[derive(Error, Debug)]
pub enum PerformanceError {
    /// Every source in the fallback chain (cache, remote, inline) failed
    /// for one song.
    #[error("Resolution failed: {0}")]
    ResolutionFailed(String),
}

pub type Result<T> = std::result::Result<T, PerformanceError>;
