//! In-memory completion backend for tests and offline runs.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use mindease_sentiment::SentimentScorer;

use crate::{ChatCompletion, ChatTurn, GatewayError};

/// Completion backend that returns a canned reply and scores the utterance
/// with the real lexicon, preserving the user-text-to-mood pairing.
pub struct MockCompletion {
    reply: String,
    scorer: SentimentScorer,
    fail: AtomicBool,
}

impl MockCompletion {
    /// A mock that always answers with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            scorer: SentimentScorer::new(),
            fail: AtomicBool::new(false),
        }
    }

    /// A mock whose every call fails with a transport error.
    pub fn failing() -> Self {
        let mock = Self::new("");
        mock.fail.store(true, Ordering::Relaxed);
        mock
    }

    /// Toggle failure mode at runtime.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::Relaxed);
    }
}

#[async_trait]
impl ChatCompletion for MockCompletion {
    async fn complete(&self, utterance: &str) -> Result<ChatTurn, GatewayError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(GatewayError::Transport(
                "mock transport failure".to_string(),
            ));
        }
        Ok(ChatTurn {
            reply: self.reply.clone(),
            mood_score: self.scorer.score(utterance),
        })
    }
}
