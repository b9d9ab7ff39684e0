use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setting is out of range or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required collaborator was not injected.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
