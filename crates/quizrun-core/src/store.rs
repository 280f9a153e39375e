//! Session state store: bridges the in-memory attempt and local durable storage.

use std::sync::Arc;
use std::time::Duration;

use crate::error::StorageError;
use crate::model::{PersistedProgress, SessionState};
use crate::storage::KeyValueStore;

/// When autosave fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosavePolicy {
    /// Fixed-interval save while the session is active.
    pub heartbeat: Duration,
    /// Quiet period after an answer change before saving.
    pub debounce: Duration,
}

impl Default for AutosavePolicy {
    fn default() -> Self {
        Self {
            heartbeat: Duration::from_secs(10),
            debounce: Duration::from_millis(1500),
        }
    }
}

/// Owns all reads and writes of persisted progress.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn key_for(quiz_id: &str) -> String {
        format!("quiz_progress_{quiz_id}")
    }

    /// Read the persisted progress for a quiz.
    ///
    /// Returns `None` when nothing is stored, the record cannot be read or
    /// parsed, or the record belongs to an attempt that was already submitted.
    pub fn restore(&self, quiz_id: &str) -> Option<PersistedProgress> {
        let key = Self::key_for(quiz_id);
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read saved progress for {quiz_id}: {e}");
                return None;
            }
        };

        match serde_json::from_str::<PersistedProgress>(&raw) {
            Ok(progress) if progress.quiz_submitted => {
                tracing::debug!("ignoring submitted progress record for {quiz_id}");
                None
            }
            Ok(progress) => {
                tracing::info!(
                    "restored progress for {quiz_id}: {} answered, question {}, {}s left",
                    progress.selected_answers.len(),
                    progress.current_question_index + 1,
                    progress.time_left
                );
                Some(progress)
            }
            Err(e) => {
                tracing::warn!("discarding unreadable progress for {quiz_id}: {e}");
                None
            }
        }
    }

    /// Write the durable subset of `state`. Saving the same state twice is a no-op in effect.
    pub fn save(&self, state: &SessionState) -> Result<(), StorageError> {
        let key = Self::key_for(&state.quiz_id);
        let body = serde_json::to_string(&state.progress()).map_err(|source| {
            StorageError::Encode {
                key: key.clone(),
                source,
            }
        })?;
        self.backend.set(&key, &body)?;
        tracing::trace!("saved progress for {}", state.quiz_id);
        Ok(())
    }

    /// Erase the persisted record.
    pub fn clear(&self, quiz_id: &str) -> Result<(), StorageError> {
        self.backend.remove(&Self::key_for(quiz_id))
    }
}
