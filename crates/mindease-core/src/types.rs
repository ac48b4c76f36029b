use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single transcript entry. Immutable once appended; insertion order is
/// display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// One mood measurement, appended per completed assistant turn.
///
/// The timestamp serializes as ISO-8601; the persisted mood history is a JSON
/// array of these samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSample {
    pub score: i32,
    pub timestamp: DateTime<Utc>,
}

impl MoodSample {
    pub fn new(score: i32, timestamp: DateTime<Utc>) -> Self {
        Self { score, timestamp }
    }
}

/// Derived display theme. Never stored — recomputed from the latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTheme {
    Sad,
    Happy,
    Neutral,
}

impl MoodTheme {
    /// Map a mood score onto a theme using the fixed thresholds.
    pub fn from_score(score: i32) -> Self {
        if score <= -2 {
            MoodTheme::Sad
        } else if score >= 2 {
            MoodTheme::Happy
        } else {
            MoodTheme::Neutral
        }
    }

    /// Theme for a mood history: the latest sample decides; empty is Neutral.
    pub fn from_history(history: &[MoodSample]) -> Self {
        history
            .last()
            .map(|s| Self::from_score(s.score))
            .unwrap_or(MoodTheme::Neutral)
    }
}

/// A time-boxed join credential for the real-time audio room.
///
/// Minted on demand, never persisted, and valid for a single join attempt —
/// the client requests a fresh one for every join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub app_id: String,
    pub channel_name: String,
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================
