//! Error types for the client-side sessions.

use mindease_core::error::MindEaseError;

/// Errors from the conversation and voice sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),
    #[error("credential fetch failed: {0}")]
    Credential(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<SessionError> for MindEaseError {
    fn from(err: SessionError) -> Self {
        MindEaseError::Session(err.to_string())
    }
}
