//! Credential issuance for the voice room.
//!
//! The issuer holds the server-side application identity and certificate and
//! mints time-boxed join credentials scoped to a single channel. Credentials
//! are never cached or persisted; every join attempt gets a fresh one.

use chrono::{DateTime, Duration, Utc};

use mindease_core::types::Credential;

use crate::error::IssuerError;
use crate::token::{build_token, RtcRole};

/// Join-token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Uid 0 lets the transport assign an ephemeral participant id.
const EPHEMERAL_UID: u32 = 0;

/// Mints signed, time-boxed join credentials for named channels.
pub struct CredentialIssuer {
    app_id: String,
    certificate: String,
    token_ttl_secs: u64,
}

impl CredentialIssuer {
    /// Create an issuer with the default one-hour token lifetime.
    pub fn new(app_id: impl Into<String>, certificate: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            certificate: certificate.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Override the token lifetime.
    pub fn with_token_ttl(mut self, ttl_secs: u64) -> Self {
        self.token_ttl_secs = ttl_secs;
        self
    }

    /// The application identity handed to clients alongside the token.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Issue a credential for `channel`, expiring `token_ttl_secs` from now.
    ///
    /// The channel is validated before any credential material is touched:
    /// an empty or blank name fails with `IssuerError::MissingChannel` and
    /// no signing takes place.
    pub fn issue(&self, channel: &str) -> Result<Credential, IssuerError> {
        self.issue_at(channel, Utc::now())
    }

    /// Issue a credential as of the instant `now`. Split out so expiry math
    /// is testable against a fixed clock.
    pub fn issue_at(&self, channel: &str, now: DateTime<Utc>) -> Result<Credential, IssuerError> {
        if channel.trim().is_empty() {
            return Err(IssuerError::MissingChannel);
        }

        let expires_at = now + Duration::seconds(self.token_ttl_secs as i64);
        let token = build_token(
            &self.app_id,
            &self.certificate,
            channel,
            EPHEMERAL_UID,
            RtcRole::Publisher,
            expires_at.timestamp(),
        )?;

        tracing::debug!(channel = %channel, expires_at = %expires_at, "Issued voice credential");

        Ok(Credential {
            token,
            app_id: self.app_id.clone(),
            channel_name: channel.to_string(),
            expires_at,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
