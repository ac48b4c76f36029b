//! Conversation session: transcript, pending flag, and mood history.
//!
//! One state machine per UI lifetime: `Idle -> Sending -> Idle` per turn,
//! with the transcript and mood log growing monotonically across turns.
//! Collaborators are injected behind trait objects so the session runs the
//! same against the HTTP mediator, the in-process gateway, or a mock.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::broadcast;

use mindease_core::events::SessionEvent;
use mindease_core::types::{Message, MoodSample, MoodTheme};
use mindease_gateway::ChatCompletion;

use crate::capability::SpeechSynthesizer;
use crate::store::MoodStore;

/// Seed message shown before the first user turn.
pub const GREETING: &str = "Hi, I'm MindEase. How are you feeling today?";

/// Fixed reply appended when the gateway fails for a turn.
pub const TURN_FAILED_REPLY: &str = "Sorry, server error. Try again later.";

/// What happened to one `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty or whitespace-only; nothing changed.
    Ignored,
    /// The turn completed and the reply was appended.
    Completed { reply: String, mood_score: i32 },
    /// The gateway failed; the fixed fallback reply was appended.
    Failed,
    /// A newer submission took over before this one resolved; the late
    /// response was discarded wholesale.
    Superseded,
}

struct ConversationState {
    transcript: Vec<Message>,
    mood_history: Vec<MoodSample>,
    pending: bool,
    /// Sequence number of the newest accepted submission. A resolving turn
    /// applies only if it still owns this number.
    latest_seq: u64,
}

/// The conversation state machine.
pub struct ConversationSession {
    state: Mutex<ConversationState>,
    completion: Arc<dyn ChatCompletion>,
    speech: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn MoodStore>,
    voice: Mutex<Option<String>>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl ConversationSession {
    /// Create a session, seeding the mood history from the store and the
    /// transcript with the greeting.
    pub fn new(
        completion: Arc<dyn ChatCompletion>,
        speech: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn MoodStore>,
    ) -> Self {
        let mood_history = store.load();
        let (event_tx, _) = broadcast::channel(256);
        Self {
            state: Mutex::new(ConversationState {
                transcript: vec![Message::assistant(GREETING)],
                mood_history,
                pending: false,
                latest_seq: 0,
            }),
            completion,
            speech,
            store,
            voice: Mutex::new(None),
            event_tx,
        }
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Select the speech voice used for replies; `None` is the host default.
    pub fn set_voice(&self, voice: Option<String>) {
        *self.voice.lock().expect("voice mutex poisoned") = voice;
    }

    /// Submit one user utterance.
    ///
    /// Empty or whitespace-only input is a no-op. Otherwise the utterance is
    /// appended, the completion is requested, and on resolution exactly one
    /// assistant message is appended — the reply, or the fixed fallback on
    /// gateway failure (in which case no mood sample is taken). All failures
    /// are absorbed; this never panics or propagates an error.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        // Cancel any in-flight speech before the new turn.
        self.speech.stop();

        let seq = {
            let mut state = self.state.lock().expect("state mutex poisoned");
            state.transcript.push(Message::user(text));
            state.pending = true;
            state.latest_seq += 1;
            state.latest_seq
        };
        self.emit(SessionEvent::TurnStarted {
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        self.emit(SessionEvent::PendingChanged {
            pending: true,
            timestamp: Utc::now(),
        });

        // The lock is not held across the network await; other interactions
        // stay responsive and may supersede this turn.
        let result = self.completion.complete(text).await;

        let (outcome, history_snapshot, spoken_reply) = {
            let mut state = self.state.lock().expect("state mutex poisoned");
            if seq != state.latest_seq {
                // A newer submission owns the pending flag now.
                drop(state);
                self.emit(SessionEvent::TurnSuperseded {
                    timestamp: Utc::now(),
                });
                tracing::debug!(seq, "Discarded stale completion response");
                return SubmitOutcome::Superseded;
            }

            match result {
                Ok(turn) => {
                    state.transcript.push(Message::assistant(&turn.reply));
                    let sample = MoodSample::new(turn.mood_score, Utc::now());
                    state.mood_history.push(sample);
                    state.pending = false;
                    (
                        SubmitOutcome::Completed {
                            reply: turn.reply.clone(),
                            mood_score: turn.mood_score,
                        },
                        Some(state.mood_history.clone()),
                        Some(turn.reply),
                    )
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Gateway failed; appending fallback reply");
                    state.transcript.push(Message::assistant(TURN_FAILED_REPLY));
                    state.pending = false;
                    (SubmitOutcome::Failed, None, None)
                }
            }
        };

        match &outcome {
            SubmitOutcome::Completed { reply, mood_score } => {
                self.emit(SessionEvent::AssistantReplied {
                    reply: reply.clone(),
                    mood_score: *mood_score,
                    timestamp: Utc::now(),
                });
                self.emit(SessionEvent::MoodSampled {
                    score: *mood_score,
                    timestamp: Utc::now(),
                });
            }
            SubmitOutcome::Failed => {
                self.emit(SessionEvent::TurnFailed {
                    reason: TURN_FAILED_REPLY.to_string(),
                    timestamp: Utc::now(),
                });
            }
            _ => {}
        }
        self.emit(SessionEvent::PendingChanged {
            pending: false,
            timestamp: Utc::now(),
        });

        // Persist after every mood-log mutation.
        if let Some(history) = history_snapshot {
            self.store.save(&history);
        }

        // Best-effort speech; failures cannot affect transcript state.
        if let Some(reply) = spoken_reply {
            let voice = self.voice.lock().expect("voice mutex poisoned").clone();
            self.speech.speak(&reply, voice.as_deref());
        }

        outcome
    }

    /// The transcript in display order.
    pub fn transcript(&self) -> Vec<Message> {
        self.state
            .lock()
            .expect("state mutex poisoned")
            .transcript
            .clone()
    }

    /// The mood history in turn order.
    pub fn mood_history(&self) -> Vec<MoodSample> {
        self.state
            .lock()
            .expect("state mutex poisoned")
            .mood_history
            .clone()
    }

    /// Whether a completion is in flight.
    pub fn is_pending(&self) -> bool {
        self.state.lock().expect("state mutex poisoned").pending
    }

    /// Current theme, derived from the latest mood sample.
    pub fn theme(&self) -> MoodTheme {
        MoodTheme::from_history(&self.state.lock().expect("state mutex poisoned").mood_history)
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine; events are advisory.
        let _ = self.event_tx.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use mindease_core::types::Sender;
    use mindease_gateway::{ChatTurn, GatewayError, MockCompletion};
    use mindease_sentiment::SentimentScorer;

    use crate::capability::NullSpeech;
    use crate::store::MemoryMoodStore;

    /// Speech synthesizer that records calls for assertions.
    #[derive(Default)]
    struct RecordingSpeech {
        spoken: Mutex<Vec<(String, Option<String>)>>,
        stops: AtomicUsize,
    }

    impl SpeechSynthesizer for RecordingSpeech {
        fn speak(&self, text: &str, voice: Option<&str>) {
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), voice.map(str::to_string)));
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn list_voices(&self) -> Vec<String> {
            vec!["test-voice".to_string()]
        }
    }

    /// Completion that blocks each call until a permit is released, so tests
    /// can overlap two in-flight turns deterministically.
    struct GatedCompletion {
        gate: Arc<Semaphore>,
        scorer: SentimentScorer,
    }

    #[async_trait]
    impl ChatCompletion for GatedCompletion {
        async fn complete(&self, utterance: &str) -> Result<ChatTurn, GatewayError> {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            Ok(ChatTurn {
                reply: format!("echo: {}", utterance),
                mood_score: self.scorer.score(utterance),
            })
        }
    }

    fn session_with(
        completion: Arc<dyn ChatCompletion>,
    ) -> (Arc<ConversationSession>, Arc<RecordingSpeech>, Arc<MemoryMoodStore>) {
        let speech = Arc::new(RecordingSpeech::default());
        let store = Arc::new(MemoryMoodStore::new());
        let session = Arc::new(ConversationSession::new(
            completion,
            Arc::clone(&speech) as Arc<dyn SpeechSynthesizer>,
            Arc::clone(&store) as Arc<dyn MoodStore>,
        ));
        (session, speech, store)
    }

    // ---- Construction ----

    #[tokio::test]
    async fn test_new_session_seeds_greeting() {
        let (session, _, _) = session_with(Arc::new(MockCompletion::new("hi")));
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].sender, Sender::Assistant);
        assert_eq!(transcript[0].text, GREETING);
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_new_session_loads_history_from_store() {
        let store = Arc::new(MemoryMoodStore::with_raw(
            r#"[{"score":2,"timestamp":"2024-06-01T12:00:00Z"}]"#,
        ));
        let session = ConversationSession::new(
            Arc::new(MockCompletion::new("hi")),
            Arc::new(NullSpeech),
            store,
        );
        assert_eq!(session.mood_history().len(), 1);
        assert_eq!(session.theme(), MoodTheme::Happy);
    }

    #[tokio::test]
    async fn test_new_session_corrupt_history_starts_empty() {
        let store = Arc::new(MemoryMoodStore::with_raw("broken [ json"));
        let session = ConversationSession::new(
            Arc::new(MockCompletion::new("hi")),
            Arc::new(NullSpeech),
            store,
        );
        assert!(session.mood_history().is_empty());
        assert_eq!(session.theme(), MoodTheme::Neutral);
    }

    // ---- Empty submissions ----

    #[tokio::test]
    async fn test_empty_submit_is_noop() {
        let (session, _, _) = session_with(Arc::new(MockCompletion::new("hi")));
        assert_eq!(session.submit("").await, SubmitOutcome::Ignored);
        assert_eq!(session.transcript().len(), 1);
        assert!(session.mood_history().is_empty());
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_whitespace_submit_is_noop() {
        let (session, speech, _) = session_with(Arc::new(MockCompletion::new("hi")));
        assert_eq!(session.submit("   \n\t ").await, SubmitOutcome::Ignored);
        assert_eq!(session.transcript().len(), 1);
        // Not even the speech cancel runs for ignored input.
        assert_eq!(speech.stops.load(Ordering::SeqCst), 0);
    }

    // ---- Successful turns ----

    #[tokio::test]
    async fn test_submit_appends_user_assistant_and_sample_in_order() {
        let (session, _, _) =
            session_with(Arc::new(MockCompletion::new("I'm so glad to hear that!")));

        let outcome = session.submit("I feel great today").await;
        assert_eq!(
            outcome,
            SubmitOutcome::Completed {
                reply: "I'm so glad to hear that!".to_string(),
                mood_score: 3,
            }
        );

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].sender, Sender::User);
        assert_eq!(transcript[1].text, "I feel great today");
        assert_eq!(transcript[2].sender, Sender::Assistant);
        assert_eq!(transcript[2].text, "I'm so glad to hear that!");

        let history = session.mood_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 3);
        assert_eq!(session.theme(), MoodTheme::Happy);
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_submit_persists_history_after_each_turn() {
        let (session, _, store) = session_with(Arc::new(MockCompletion::new("ok")));
        session.submit("feeling good").await;
        session.submit("still good").await;

        let persisted = store.load();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted, session.mood_history());
    }

    #[tokio::test]
    async fn test_submit_speaks_reply_with_selected_voice() {
        let (session, speech, _) = session_with(Arc::new(MockCompletion::new("take care")));
        session.set_voice(Some("en-GB".to_string()));
        session.submit("hello").await;

        let spoken = speech.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].0, "take care");
        assert_eq!(spoken[0].1.as_deref(), Some("en-GB"));
    }

    #[tokio::test]
    async fn test_submit_cancels_inflight_speech_first() {
        let (session, speech, _) = session_with(Arc::new(MockCompletion::new("ok")));
        session.submit("one").await;
        session.submit("two").await;
        assert_eq!(speech.stops.load(Ordering::SeqCst), 2);
    }

    // ---- Gateway failure ----

    #[tokio::test]
    async fn test_gateway_failure_appends_fixed_reply_only() {
        let (session, speech, _) = session_with(Arc::new(MockCompletion::failing()));

        let outcome = session.submit("I am sad").await;
        assert_eq!(outcome, SubmitOutcome::Failed);

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].sender, Sender::Assistant);
        assert_eq!(transcript[2].text, TURN_FAILED_REPLY);

        // Mood log only grows on successful turns.
        assert!(session.mood_history().is_empty());
        assert!(!session.is_pending());
        // Failed replies are not spoken.
        assert!(speech.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_then_success_keeps_turn_order() {
        let mock = Arc::new(MockCompletion::new("better now"));
        let (session, _, _) = session_with(Arc::clone(&mock) as Arc<dyn ChatCompletion>);

        mock.set_failing(true);
        session.submit("first").await;
        mock.set_failing(false);
        session.submit("feeling happy").await;

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 5);
        assert_eq!(transcript[2].text, TURN_FAILED_REPLY);
        assert_eq!(transcript[4].text, "better now");
        assert_eq!(session.mood_history().len(), 1);
        assert_eq!(session.mood_history()[0].score, 3);
    }

    // ---- Stale-response discard ----

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let gate = Arc::new(Semaphore::new(0));
        let completion = Arc::new(GatedCompletion {
            gate: Arc::clone(&gate),
            scorer: SentimentScorer::new(),
        });
        let (session, _, _) = session_with(completion);

        let s1 = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit("first").await })
        };
        tokio::task::yield_now().await;
        let s2 = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit("second, feeling great").await })
        };
        tokio::task::yield_now().await;

        // Release the first waiter; its turn is no longer the newest.
        gate.add_permits(1);
        let first = s1.await.unwrap();
        assert_eq!(first, SubmitOutcome::Superseded);
        // The stale turn must not clear the newer turn's pending flag.
        assert!(session.is_pending());

        gate.add_permits(1);
        let second = s2.await.unwrap();
        assert!(matches!(second, SubmitOutcome::Completed { .. }));
        assert!(!session.is_pending());

        // Both user messages are present, but only one assistant reply.
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[3].text, "echo: second, feeling great");
        assert_eq!(session.mood_history().len(), 1);
        assert_eq!(session.mood_history()[0].score, 3);
    }

    // ---- Events ----

    #[tokio::test]
    async fn test_events_fire_in_order_for_success() {
        let (session, _, _) = session_with(Arc::new(MockCompletion::new("ok")));
        let mut rx = session.subscribe();
        session.submit("feeling fine").await;

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.event_name());
        }
        assert_eq!(
            names,
            vec![
                "turn_started",
                "pending_changed",
                "assistant_replied",
                "mood_sampled",
                "pending_changed",
            ]
        );
    }

    #[tokio::test]
    async fn test_events_fire_for_failure() {
        let (session, _, _) = session_with(Arc::new(MockCompletion::failing()));
        let mut rx = session.subscribe();
        session.submit("hello").await;

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.event_name());
        }
        assert_eq!(
            names,
            vec![
                "turn_started",
                "pending_changed",
                "turn_failed",
                "pending_changed",
            ]
        );
    }
}
