//! Application state shared across all route handlers.
//!
//! AppState holds the two per-request mediators. Both are stateless, so the
//! server needs no locking discipline; `Arc` makes cloning into handler
//! tasks cheap.

use std::sync::Arc;
use std::time::Instant;

use mindease_gateway::ChatCompletion;
use mindease_rtc::CredentialIssuer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Completion mediator (HTTP gateway in production, mock in tests).
    pub completion: Arc<dyn ChatCompletion>,
    /// Credential issuer for the voice room.
    pub issuer: Arc<CredentialIssuer>,
    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given mediators.
    pub fn new(completion: Arc<dyn ChatCompletion>, issuer: CredentialIssuer) -> Self {
        Self {
            completion,
            issuer: Arc::new(issuer),
            start_time: Instant::now(),
        }
    }
}
