//! Short-lived cache of raw question lists, keyed by source.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

struct Entry {
    stored_at: Instant,
    questions: Vec<Value>,
}

/// Per-source question cache with a fixed time-to-live.
pub struct QuestionCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl QuestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached questions for `source_id`, if present and fresh.
    pub fn get(&self, source_id: &str) -> Option<Vec<Value>> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(source_id) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                tracing::debug!("using cached questions for {source_id}");
                Some(entry.questions.clone())
            }
            Some(_) => {
                entries.remove(source_id);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, source_id: &str, questions: Vec<Value>) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                source_id.to_string(),
                Entry {
                    stored_at: Instant::now(),
                    questions,
                },
            );
        }
    }
}

impl Default for QuestionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
