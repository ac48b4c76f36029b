use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All domain events emitted by the client-side sessions.
///
/// The sessions are explicit observables: rather than relying on implicit
/// re-render triggers, state changes are published over a broadcast channel
/// and consumed by:
/// - UI layers re-deriving presentation state (theme, chart, pending spinner)
/// - The event log (for audit/debugging)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SessionEvent {
    // =========================================================================
    // Conversation events
    // =========================================================================
    /// A non-empty submission was accepted and a completion request started.
    TurnStarted {
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// The assistant reply for the current turn arrived.
    AssistantReplied {
        reply: String,
        mood_score: i32,
        timestamp: DateTime<Utc>,
    },

    /// The gateway failed for this turn; a fixed fallback reply was appended.
    TurnFailed {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived for a turn that is no longer the newest and was
    /// discarded without touching the transcript.
    TurnSuperseded { timestamp: DateTime<Utc> },

    /// A mood sample was appended to the history.
    MoodSampled {
        score: i32,
        timestamp: DateTime<Utc>,
    },

    /// The pending (completion in flight) flag changed.
    PendingChanged {
        pending: bool,
        timestamp: DateTime<Utc>,
    },

    // =========================================================================
    // Voice events
    // =========================================================================
    /// A join was accepted and credential/transport setup began.
    VoiceConnecting {
        channel: String,
        timestamp: DateTime<Utc>,
    },

    /// The local participant is connected and publishing.
    VoiceConnected {
        channel: String,
        timestamp: DateTime<Utc>,
    },

    /// A join attempt failed; the session is back to Disconnected.
    VoiceJoinFailed {
        channel: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The local participant left the room.
    VoiceLeft {
        channel: String,
        timestamp: DateTime<Utc>,
    },

    /// The local capture track was muted or unmuted.
    MuteToggled {
        muted: bool,
        timestamp: DateTime<Utc>,
    },

    /// A remote publisher was subscribed for playback.
    RemoteSubscribed {
        user: String,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::TurnStarted { timestamp, .. }
            | SessionEvent::AssistantReplied { timestamp, .. }
            | SessionEvent::TurnFailed { timestamp, .. }
            | SessionEvent::TurnSuperseded { timestamp }
            | SessionEvent::MoodSampled { timestamp, .. }
            | SessionEvent::PendingChanged { timestamp, .. }
            | SessionEvent::VoiceConnecting { timestamp, .. }
            | SessionEvent::VoiceConnected { timestamp, .. }
            | SessionEvent::VoiceJoinFailed { timestamp, .. }
            | SessionEvent::VoiceLeft { timestamp, .. }
            | SessionEvent::MuteToggled { timestamp, .. }
            | SessionEvent::RemoteSubscribed { timestamp, .. } => *timestamp,
        }
    }

    /// Returns a human-readable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::TurnStarted { .. } => "turn_started",
            SessionEvent::AssistantReplied { .. } => "assistant_replied",
            SessionEvent::TurnFailed { .. } => "turn_failed",
            SessionEvent::TurnSuperseded { .. } => "turn_superseded",
            SessionEvent::MoodSampled { .. } => "mood_sampled",
            SessionEvent::PendingChanged { .. } => "pending_changed",
            SessionEvent::VoiceConnecting { .. } => "voice_connecting",
            SessionEvent::VoiceConnected { .. } => "voice_connected",
            SessionEvent::VoiceJoinFailed { .. } => "voice_join_failed",
            SessionEvent::VoiceLeft { .. } => "voice_left",
            SessionEvent::MuteToggled { .. } => "mute_toggled",
            SessionEvent::RemoteSubscribed { .. } => "remote_subscribed",
        }
    }
}
