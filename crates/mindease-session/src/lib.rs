//! Client-side state machines for the MindEase companion.
//!
//! `ConversationSession` owns the transcript, pending flag, and mood history;
//! `VoiceSession` owns the join/leave/mute lifecycle of the real-time audio
//! room. Host-platform facilities (speech, storage, transport, credentials)
//! sit behind capability traits with non-browser implementations.

pub mod capability;
pub mod client;
pub mod conversation;
pub mod error;
pub mod store;
pub mod voice;

pub use capability::{CredentialSource, NullSpeech, SpeechSynthesizer};
pub use client::ChatApiClient;
pub use conversation::{ConversationSession, SubmitOutcome, GREETING, TURN_FAILED_REPLY};
pub use error::SessionError;
pub use store::{JsonFileMoodStore, MemoryMoodStore, MoodStore, STORAGE_FILE};
pub use voice::{MockVoiceTransport, TrackHandle, VoiceSession, VoiceState, VoiceTransport};
