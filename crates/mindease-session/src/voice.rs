//! Voice session: join/leave/mute lifecycle for the real-time audio room.
//!
//! Enforces valid state transitions for the voice lifecycle:
//! - Disconnected -> Connecting (join accepted)
//! - Connecting -> Connected (credential + transport + track + publish done)
//! - Connecting -> Disconnected (any join step failed, resources rolled back)
//! - Connected -> Disconnected (leave)
//!
//! The transport client is an explicitly owned resource with an explicit
//! lifecycle, not an ambient global. Every resource acquired during a join
//! is released if a later step of the same join fails.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use mindease_core::events::SessionEvent;
use mindease_core::types::Credential;

use crate::capability::CredentialSource;
use crate::error::SessionError;

/// Connection state of the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceState {
    /// Not in a room. Ready to join.
    Disconnected,
    /// Join in progress: credential fetch, transport connect, publish.
    Connecting,
    /// In the room with the local track published.
    Connected,
}

impl fmt::Display for VoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceState::Disconnected => write!(f, "Disconnected"),
            VoiceState::Connecting => write!(f, "Connecting"),
            VoiceState::Connected => write!(f, "Connected"),
        }
    }
}

impl VoiceState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &VoiceState) -> bool {
        matches!(
            (self, target),
            (VoiceState::Disconnected, VoiceState::Connecting)
                | (VoiceState::Connecting, VoiceState::Connected)
                // Join failure rollback
                | (VoiceState::Connecting, VoiceState::Disconnected)
                | (VoiceState::Connected, VoiceState::Disconnected)
        )
    }
}

/// Opaque handle to a local audio capture track owned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackHandle(pub u64);

/// The external real-time SDK boundary: connect/publish/subscribe primitives.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Connect to the room named in the credential.
    async fn connect(&self, credential: &Credential) -> Result<(), SessionError>;

    /// Acquire a local microphone capture track.
    async fn create_audio_track(&self) -> Result<TrackHandle, SessionError>;

    /// Publish the local track into the room.
    async fn publish(&self, track: &TrackHandle) -> Result<(), SessionError>;

    /// Enable or disable the local track. Local-only, no network round-trip.
    fn set_track_enabled(&self, track: &TrackHandle, enabled: bool);

    /// Subscribe to a remote publisher and begin playback.
    async fn subscribe(&self, user: &str) -> Result<(), SessionError>;

    /// Stop and release a local track.
    async fn close_track(&self, track: TrackHandle);

    /// Disconnect from the room.
    async fn disconnect(&self);
}

struct VoiceInner {
    state: VoiceState,
    muted: bool,
    track: Option<TrackHandle>,
    channel: Option<String>,
}

/// The voice-room state machine.
pub struct VoiceSession {
    inner: Mutex<VoiceInner>,
    credentials: Arc<dyn CredentialSource>,
    transport: Arc<dyn VoiceTransport>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl VoiceSession {
    pub fn new(credentials: Arc<dyn CredentialSource>, transport: Arc<dyn VoiceTransport>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(VoiceInner {
                state: VoiceState::Disconnected,
                muted: false,
                track: None,
                channel: None,
            }),
            credentials,
            transport,
            event_tx,
        }
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> VoiceState {
        self.inner.lock().expect("voice mutex poisoned").state
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().expect("voice mutex poisoned").muted
    }

    /// Join `channel`: fetch a fresh credential, connect, acquire and publish
    /// the local track. Valid only from Disconnected.
    pub async fn join(&self, channel: &str) -> Result<(), SessionError> {
        {
            let mut inner = self.inner.lock().expect("voice mutex poisoned");
            if !inner.state.can_transition_to(&VoiceState::Connecting) {
                return Err(SessionError::InvalidTransition(format!(
                    "{} -> {}",
                    inner.state,
                    VoiceState::Connecting
                )));
            }
            inner.state = VoiceState::Connecting;
            inner.channel = Some(channel.to_string());
        }
        self.emit(SessionEvent::VoiceConnecting {
            channel: channel.to_string(),
            timestamp: Utc::now(),
        });

        // Every join fetches a fresh credential; none are cached or reused.
        let credential = match self.credentials.fetch(channel).await {
            Ok(c) => c,
            Err(e) => return self.fail_join(channel, None, false, e).await,
        };

        if let Err(e) = self.transport.connect(&credential).await {
            return self.fail_join(channel, None, false, e).await;
        }

        let track = match self.transport.create_audio_track().await {
            Ok(t) => t,
            Err(e) => return self.fail_join(channel, None, true, e).await,
        };

        if let Err(e) = self.transport.publish(&track).await {
            return self.fail_join(channel, Some(track), true, e).await;
        }

        {
            let mut inner = self.inner.lock().expect("voice mutex poisoned");
            inner.state = VoiceState::Connected;
            inner.muted = false;
            inner.track = Some(track);
        }
        self.emit(SessionEvent::VoiceConnected {
            channel: channel.to_string(),
            timestamp: Utc::now(),
        });
        tracing::info!(channel = %channel, "Joined voice room");
        Ok(())
    }

    /// Flip the local mute flag and the track's enabled state.
    /// Valid only from Connected.
    pub fn toggle_mute(&self) -> Result<bool, SessionError> {
        let muted = {
            let mut inner = self.inner.lock().expect("voice mutex poisoned");
            if inner.state != VoiceState::Connected {
                return Err(SessionError::InvalidTransition(format!(
                    "toggle_mute requires Connected, currently {}",
                    inner.state
                )));
            }
            inner.muted = !inner.muted;
            let muted = inner.muted;
            if let Some(ref track) = inner.track {
                self.transport.set_track_enabled(track, !muted);
            }
            muted
        };
        self.emit(SessionEvent::MuteToggled {
            muted,
            timestamp: Utc::now(),
        });
        Ok(muted)
    }

    /// Leave the room: release the local track exactly once, disconnect,
    /// reset mute. Valid only from Connected.
    pub async fn leave(&self) -> Result<(), SessionError> {
        let (track, channel) = {
            let mut inner = self.inner.lock().expect("voice mutex poisoned");
            if !inner.state.can_transition_to(&VoiceState::Disconnected) {
                return Err(SessionError::InvalidTransition(format!(
                    "{} -> {}",
                    inner.state,
                    VoiceState::Disconnected
                )));
            }
            inner.state = VoiceState::Disconnected;
            inner.muted = false;
            (inner.track.take(), inner.channel.take())
        };

        if let Some(track) = track {
            self.transport.close_track(track).await;
        }
        self.transport.disconnect().await;

        let channel = channel.unwrap_or_default();
        self.emit(SessionEvent::VoiceLeft {
            channel: channel.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(channel = %channel, "Left voice room");
        Ok(())
    }

    /// A remote participant published; subscribe and start playback.
    /// Fire-and-forget: failures are logged and local state is untouched.
    pub async fn handle_remote_published(&self, user: &str) {
        match self.transport.subscribe(user).await {
            Ok(()) => {
                self.emit(SessionEvent::RemoteSubscribed {
                    user: user.to_string(),
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Remote subscribe failed");
            }
        }
    }

    /// Roll back a failed join: release whatever was acquired, return to
    /// Disconnected, and surface the failure.
    async fn fail_join(
        &self,
        channel: &str,
        track: Option<TrackHandle>,
        connected: bool,
        err: SessionError,
    ) -> Result<(), SessionError> {
        if let Some(track) = track {
            self.transport.close_track(track).await;
        }
        if connected {
            self.transport.disconnect().await;
        }
        {
            let mut inner = self.inner.lock().expect("voice mutex poisoned");
            inner.state = VoiceState::Disconnected;
            inner.muted = false;
            inner.channel = None;
        }
        self.emit(SessionEvent::VoiceJoinFailed {
            channel: channel.to_string(),
            reason: err.to_string(),
            timestamp: Utc::now(),
        });
        tracing::warn!(channel = %channel, error = %err, "Failed to join voice room");
        Err(err)
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}

// =============================================================================
// Mock transport
// =============================================================================

/// A transport call observed by [`MockVoiceTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Connect(String),
    CreateTrack,
    Publish(u64),
    SetEnabled(u64, bool),
    Subscribe(String),
    CloseTrack(u64),
    Disconnect,
}

/// In-memory transport standing in for the external SDK. Records every call
/// and supports step-level failure injection; with no failures armed it is a
/// working no-op transport for non-browser targets.
#[derive(Debug, Default)]
pub struct MockVoiceTransport {
    calls: Mutex<Vec<TransportCall>>,
    next_track: AtomicU64,
    fail_connect: AtomicBool,
    fail_create_track: AtomicBool,
    fail_publish: AtomicBool,
    fail_subscribe: AtomicBool,
}

impl MockVoiceTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::Relaxed);
    }

    pub fn fail_create_track(&self, fail: bool) {
        self.fail_create_track.store(fail, Ordering::Relaxed);
    }

    pub fn fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::Relaxed);
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::Relaxed);
    }

    /// All calls observed so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl VoiceTransport for MockVoiceTransport {
    async fn connect(&self, credential: &Credential) -> Result<(), SessionError> {
        self.record(TransportCall::Connect(credential.channel_name.clone()));
        if self.fail_connect.load(Ordering::Relaxed) {
            return Err(SessionError::Transport("connect rejected".to_string()));
        }
        Ok(())
    }

    async fn create_audio_track(&self) -> Result<TrackHandle, SessionError> {
        self.record(TransportCall::CreateTrack);
        if self.fail_create_track.load(Ordering::Relaxed) {
            return Err(SessionError::Transport("no capture device".to_string()));
        }
        Ok(TrackHandle(self.next_track.fetch_add(1, Ordering::Relaxed)))
    }

    async fn publish(&self, track: &TrackHandle) -> Result<(), SessionError> {
        self.record(TransportCall::Publish(track.0));
        if self.fail_publish.load(Ordering::Relaxed) {
            return Err(SessionError::Transport("publish rejected".to_string()));
        }
        Ok(())
    }

    fn set_track_enabled(&self, track: &TrackHandle, enabled: bool) {
        self.record(TransportCall::SetEnabled(track.0, enabled));
    }

    async fn subscribe(&self, user: &str) -> Result<(), SessionError> {
        self.record(TransportCall::Subscribe(user.to_string()));
        if self.fail_subscribe.load(Ordering::Relaxed) {
            return Err(SessionError::Transport("subscribe rejected".to_string()));
        }
        Ok(())
    }

    async fn close_track(&self, track: TrackHandle) {
        self.record(TransportCall::CloseTrack(track.0));
    }

    async fn disconnect(&self) {
        self.record(TransportCall::Disconnect);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    struct StaticCredentials {
        fail: bool,
    }

    #[async_trait]
    impl CredentialSource for StaticCredentials {
        async fn fetch(&self, channel: &str) -> Result<Credential, SessionError> {
            if self.fail {
                return Err(SessionError::Credential("status 500".to_string()));
            }
            Ok(Credential {
                token: "006test".to_string(),
                app_id: "test-app".to_string(),
                channel_name: channel.to_string(),
                expires_at: Utc::now() + Duration::seconds(3600),
            })
        }
    }

    fn session() -> (Arc<VoiceSession>, Arc<MockVoiceTransport>) {
        session_with_credentials(false)
    }

    fn session_with_credentials(fail: bool) -> (Arc<VoiceSession>, Arc<MockVoiceTransport>) {
        let transport = Arc::new(MockVoiceTransport::new());
        let session = Arc::new(VoiceSession::new(
            Arc::new(StaticCredentials { fail }),
            Arc::clone(&transport) as Arc<dyn VoiceTransport>,
        ));
        (session, transport)
    }

    fn close_count(transport: &MockVoiceTransport) -> usize {
        transport
            .calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::CloseTrack(_)))
            .count()
    }

    // ---- Transition table ----

    #[test]
    fn test_state_display() {
        assert_eq!(VoiceState::Disconnected.to_string(), "Disconnected");
        assert_eq!(VoiceState::Connecting.to_string(), "Connecting");
        assert_eq!(VoiceState::Connected.to_string(), "Connected");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(VoiceState::Disconnected.can_transition_to(&VoiceState::Connecting));
        assert!(VoiceState::Connecting.can_transition_to(&VoiceState::Connected));
        assert!(VoiceState::Connecting.can_transition_to(&VoiceState::Disconnected));
        assert!(VoiceState::Connected.can_transition_to(&VoiceState::Disconnected));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!VoiceState::Disconnected.can_transition_to(&VoiceState::Connected));
        assert!(!VoiceState::Connected.can_transition_to(&VoiceState::Connecting));
        assert!(!VoiceState::Disconnected.can_transition_to(&VoiceState::Disconnected));
        assert!(!VoiceState::Connected.can_transition_to(&VoiceState::Connected));
    }

    // ---- Join ----

    #[tokio::test]
    async fn test_join_happy_path() {
        let (session, transport) = session();
        session.join("mindease_room").await.unwrap();

        assert_eq!(session.state(), VoiceState::Connected);
        assert!(!session.is_muted());
        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::Connect("mindease_room".to_string()),
                TransportCall::CreateTrack,
                TransportCall::Publish(0),
            ]
        );
    }

    #[tokio::test]
    async fn test_join_while_connected_is_rejected() {
        let (session, _) = session();
        session.join("room").await.unwrap();
        let result = session.join("room").await;
        assert!(matches!(result, Err(SessionError::InvalidTransition(_))));
        // Still connected; the failed join did not disturb the session.
        assert_eq!(session.state(), VoiceState::Connected);
    }

    #[tokio::test]
    async fn test_join_credential_failure_rolls_back() {
        let (session, transport) = session_with_credentials(true);
        let result = session.join("room").await;
        assert!(matches!(result, Err(SessionError::Credential(_))));
        assert_eq!(session.state(), VoiceState::Disconnected);
        // Nothing was acquired, so nothing to release.
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_join_connect_failure_rolls_back() {
        let (session, transport) = session();
        transport.fail_connect(true);
        let result = session.join("room").await;
        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert_eq!(session.state(), VoiceState::Disconnected);
        assert_eq!(
            transport.calls(),
            vec![TransportCall::Connect("room".to_string())]
        );
    }

    #[tokio::test]
    async fn test_join_track_failure_disconnects() {
        let (session, transport) = session();
        transport.fail_create_track(true);
        let result = session.join("room").await;
        assert!(result.is_err());
        assert_eq!(session.state(), VoiceState::Disconnected);
        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::Connect("room".to_string()),
                TransportCall::CreateTrack,
                TransportCall::Disconnect,
            ]
        );
    }

    #[tokio::test]
    async fn test_join_publish_failure_releases_track_and_disconnects() {
        let (session, transport) = session();
        transport.fail_publish(true);
        let result = session.join("room").await;
        assert!(result.is_err());
        assert_eq!(session.state(), VoiceState::Disconnected);
        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::Connect("room".to_string()),
                TransportCall::CreateTrack,
                TransportCall::Publish(0),
                TransportCall::CloseTrack(0),
                TransportCall::Disconnect,
            ]
        );
    }

    #[tokio::test]
    async fn test_rejoin_after_failed_join_succeeds() {
        let (session, transport) = session();
        transport.fail_publish(true);
        assert!(session.join("room").await.is_err());
        transport.fail_publish(false);
        session.join("room").await.unwrap();
        assert_eq!(session.state(), VoiceState::Connected);
    }

    // ---- Mute ----

    #[tokio::test]
    async fn test_toggle_mute_before_join_is_rejected() {
        let (session, transport) = session();
        let result = session.toggle_mute();
        assert!(matches!(result, Err(SessionError::InvalidTransition(_))));
        assert!(!session.is_muted());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_mute_flips_track_enabled() {
        let (session, transport) = session();
        session.join("room").await.unwrap();

        assert_eq!(session.toggle_mute().unwrap(), true);
        assert!(session.is_muted());
        assert_eq!(session.toggle_mute().unwrap(), false);
        assert!(!session.is_muted());

        let calls = transport.calls();
        assert!(calls.contains(&TransportCall::SetEnabled(0, false)));
        assert!(calls.contains(&TransportCall::SetEnabled(0, true)));
    }

    // ---- Leave ----

    #[tokio::test]
    async fn test_leave_before_join_is_rejected() {
        let (session, _) = session();
        let result = session.leave().await;
        assert!(matches!(result, Err(SessionError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_leave_releases_track_exactly_once() {
        let (session, transport) = session();
        session.join("room").await.unwrap();
        session.toggle_mute().unwrap();
        session.leave().await.unwrap();

        assert_eq!(session.state(), VoiceState::Disconnected);
        // Leaving always resets muted.
        assert!(!session.is_muted());
        assert_eq!(close_count(&transport), 1);
        assert!(transport.calls().contains(&TransportCall::Disconnect));

        // A second leave is invalid and must not release anything again.
        assert!(session.leave().await.is_err());
        assert_eq!(close_count(&transport), 1);
    }

    #[tokio::test]
    async fn test_rejoin_after_leave() {
        let (session, _) = session();
        session.join("room").await.unwrap();
        session.leave().await.unwrap();
        session.join("room").await.unwrap();
        assert_eq!(session.state(), VoiceState::Connected);
    }

    // ---- Remote participants ----

    #[tokio::test]
    async fn test_remote_publish_subscribes_without_state_change() {
        let (session, transport) = session();
        session.join("room").await.unwrap();
        session.toggle_mute().unwrap();

        session.handle_remote_published("remote-7").await;

        assert!(transport
            .calls()
            .contains(&TransportCall::Subscribe("remote-7".to_string())));
        // joined/muted are about the local participant only.
        assert_eq!(session.state(), VoiceState::Connected);
        assert!(session.is_muted());
    }

    #[tokio::test]
    async fn test_remote_subscribe_failure_is_absorbed() {
        let (session, transport) = session();
        session.join("room").await.unwrap();
        transport.fail_subscribe(true);
        // Must not panic or change state.
        session.handle_remote_published("remote-9").await;
        assert_eq!(session.state(), VoiceState::Connected);
    }

    // ---- Events ----

    #[tokio::test]
    async fn test_join_leave_event_sequence() {
        let (session, _) = session();
        let mut rx = session.subscribe();
        session.join("room").await.unwrap();
        session.toggle_mute().unwrap();
        session.leave().await.unwrap();

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.event_name());
        }
        assert_eq!(
            names,
            vec![
                "voice_connecting",
                "voice_connected",
                "mute_toggled",
                "voice_left",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_join_emits_join_failed() {
        let (session, transport) = session();
        transport.fail_connect(true);
        let mut rx = session.subscribe();
        let _ = session.join("room").await;

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.event_name());
        }
        assert_eq!(names, vec!["voice_connecting", "voice_join_failed"]);
    }
}
