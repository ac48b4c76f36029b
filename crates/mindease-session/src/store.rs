//! Durable mood-history storage.
//!
//! The history is one JSON array of samples under a fixed storage name.
//! Loading never fails: missing or corrupt data degrades to an empty
//! history.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mindease_core::types::MoodSample;

/// File name of the persisted history (the fixed storage key).
pub const STORAGE_FILE: &str = "mood_history.json";

/// Persists the mood history. `load` is total; `save` is best-effort.
pub trait MoodStore: Send + Sync {
    fn load(&self) -> Vec<MoodSample>;
    fn save(&self, history: &[MoodSample]);
}

/// Parse a raw history document, degrading to empty on corruption.
fn parse_history(raw: &str) -> Vec<MoodSample> {
    match serde_json::from_str(raw) {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(error = %e, "Stored mood history is corrupt; starting empty");
            Vec::new()
        }
    }
}

/// In-memory store holding the raw serialized document, so tests can inject
/// corrupt content the same way a real host could encounter it.
#[derive(Debug, Default)]
pub struct MemoryMoodStore {
    raw: Mutex<Option<String>>,
}

impl MemoryMoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a raw document (valid or not).
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// The raw document as last saved, if any.
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().expect("store mutex poisoned").clone()
    }
}

impl MoodStore for MemoryMoodStore {
    fn load(&self) -> Vec<MoodSample> {
        self.raw
            .lock()
            .expect("store mutex poisoned")
            .as_deref()
            .map(parse_history)
            .unwrap_or_default()
    }

    fn save(&self, history: &[MoodSample]) {
        match serde_json::to_string(history) {
            Ok(raw) => *self.raw.lock().expect("store mutex poisoned") = Some(raw),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize mood history"),
        }
    }
}

/// File-backed store keeping the history under `<data_dir>/mood_history.json`.
#[derive(Debug, Clone)]
pub struct JsonFileMoodStore {
    path: PathBuf,
}

impl JsonFileMoodStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MoodStore for JsonFileMoodStore {
    fn load(&self) -> Vec<MoodSample> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => parse_history(&raw),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "No stored mood history");
                Vec::new()
            }
        }
    }

    fn save(&self, history: &[MoodSample]) {
        let raw = match serde_json::to_string(history) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize mood history");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create data dir");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, raw) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist mood history");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
