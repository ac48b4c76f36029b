//! Server-side completion mediator.
//!
//! Forwards a user utterance plus a fixed system persona to the remote
//! chat-completion provider, scores the utterance's sentiment, and applies
//! the fallback rules when the provider misbehaves. Stateless per request:
//! no conversation history is forwarded.

pub mod client;
pub mod mock;

use async_trait::async_trait;

use mindease_core::error::MindEaseError;

pub use client::CompletionGateway;
pub use mock::MockCompletion;

/// The observable result of one mediated turn: the assistant's reply paired
/// with the mood score of the *user's* utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub reply: String,
    pub mood_score: i32,
}

/// Errors from the completion mediator.
///
/// Only transport-level failures surface as errors; provider-reported errors
/// and malformed bodies are absorbed into the reply per the fallback rules.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned status {status} with an unreadable body")]
    UpstreamStatus { status: u16 },
    #[error("client construction failed: {0}")]
    Client(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

impl From<GatewayError> for MindEaseError {
    fn from(err: GatewayError) -> Self {
        MindEaseError::Gateway(err.to_string())
    }
}

/// Object-safe seam between callers (HTTP handlers, the conversation
/// session) and whatever produces assistant replies.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Produce the assistant reply and mood score for one user utterance.
    async fn complete(&self, utterance: &str) -> Result<ChatTurn, GatewayError>;
}
