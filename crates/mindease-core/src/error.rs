use thiserror::Error;

/// Top-level error type for the MindEase system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for MindEaseError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MindEaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Issuer error: {0}")]
    Issuer(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MindEaseError {
    fn from(err: toml::de::Error) -> Self {
        MindEaseError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MindEaseError {
    fn from(err: toml::ser::Error) -> Self {
        MindEaseError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MindEaseError {
    fn from(err: serde_json::Error) -> Self {
        MindEaseError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for MindEase operations.
pub type Result<T> = std::result::Result<T, MindEaseError>;
