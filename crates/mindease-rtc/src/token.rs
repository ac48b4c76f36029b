//! Signed join-token builder for the real-time transport.
//!
//! A token binds an application identity to a channel, a participant uid, a
//! role, and an expiry instant. It is an HMAC-SHA256 signature over those
//! fields, keyed by the application certificate, packed together with the
//! signed fields and base64-encoded behind a version prefix. Given the same
//! inputs the builder always produces the same token.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::IssuerError;

type HmacSha256 = Hmac<Sha256>;

/// Token format version prefix.
const VERSION: &str = "006";

/// Participant role encoded into the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcRole {
    /// May publish audio into the channel.
    Publisher,
    /// May only subscribe to remote publishers.
    Subscriber,
}

impl RtcRole {
    fn as_u8(self) -> u8 {
        match self {
            RtcRole::Publisher => 1,
            RtcRole::Subscriber => 2,
        }
    }
}

/// Build a signed join token for `channel`.
///
/// Fails with `IssuerError::Signing` if the application identity or
/// certificate is absent — the signature is meaningless without them.
pub fn build_token(
    app_id: &str,
    certificate: &str,
    channel: &str,
    uid: u32,
    role: RtcRole,
    expire_ts: i64,
) -> Result<String, IssuerError> {
    if app_id.is_empty() {
        return Err(IssuerError::Signing("app id is not configured".to_string()));
    }
    if certificate.is_empty() {
        return Err(IssuerError::Signing(
            "app certificate is not configured".to_string(),
        ));
    }

    let message = format!(
        "{}:{}:{}:{}:{}",
        app_id,
        channel,
        uid,
        role.as_u8(),
        expire_ts
    );

    let mut mac = HmacSha256::new_from_slice(certificate.as_bytes())
        .map_err(|e| IssuerError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    let signature = mac.finalize().into_bytes();

    let mut packed = Vec::with_capacity(signature.len() + message.len());
    packed.extend_from_slice(&signature);
    packed.extend_from_slice(message.as_bytes());

    Ok(format!(
        "{}{}{}",
        VERSION,
        app_id,
        BASE64_STANDARD.encode(packed)
    ))
}

// =============================================================================
// Tests
// =============================================================================
