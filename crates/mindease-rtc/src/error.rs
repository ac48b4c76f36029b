//! Error types for credential issuance.

use mindease_core::error::MindEaseError;

/// Errors from the credential issuer.
///
/// `MissingChannel` is a validation failure and maps to a 4xx at the wire;
/// `Signing` is a server-side failure and maps to a 5xx.
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    #[error("channel name is required")]
    MissingChannel,
    #[error("credential signing failed: {0}")]
    Signing(String),
}

impl IssuerError {
    /// Whether this error is a caller-input validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, IssuerError::MissingChannel)
    }
}

impl From<IssuerError> for MindEaseError {
    fn from(err: IssuerError) -> Self {
        match err {
            IssuerError::MissingChannel => MindEaseError::Validation(err.to_string()),
            IssuerError::Signing(msg) => MindEaseError::Issuer(msg),
        }
    }
}
