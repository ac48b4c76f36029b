//! Server-side credential issuance for the third-party real-time audio room.

pub mod error;
pub mod issuer;
pub mod token;

pub use error::IssuerError;
pub use issuer::{CredentialIssuer, DEFAULT_TOKEN_TTL_SECS};
pub use token::RtcRole;
