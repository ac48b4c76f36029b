//! Host-capability seams.
//!
//! Speech synthesis and credential fetching are host-platform facilities.
//! They live behind small traits so the sessions stay testable and usable
//! on non-browser targets.

use async_trait::async_trait;

use mindease_core::types::Credential;

use crate::error::SessionError;

/// Text-to-speech output. All operations are best-effort: a speech failure
/// must never affect transcript state, so nothing here returns a Result.
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` with the given voice, or the platform default.
    fn speak(&self, text: &str, voice: Option<&str>);

    /// Cancel all in-flight speech. Idempotent; safe to call when idle.
    fn stop(&self);

    /// Voices available on this host.
    fn list_voices(&self) -> Vec<String>;
}

/// No-op speech synthesizer for hosts without audio output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpeech;

impl SpeechSynthesizer for NullSpeech {
    fn speak(&self, text: &str, _voice: Option<&str>) {
        tracing::debug!(text_len = text.len(), "Speech output unavailable; reply not spoken");
    }

    fn stop(&self) {}

    fn list_voices(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Fetches a fresh join credential for a channel. Credentials are single-use
/// per join attempt; implementations must not cache them.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self, channel: &str) -> Result<Credential, SessionError>;
}
