//! Collaborator ports and their wire payloads.
//!
//! These async traits are implemented by `quizrun-api`. Implementations
//! return [`crate::error::ApiError`] values inside `anyhow::Error` so callers
//! can downcast and classify failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Where quiz questions and attempt history come from.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// Raw question records for a document/source, in order.
    async fn fetch_questions(&self, source_id: &str) -> anyhow::Result<Vec<serde_json::Value>>;

    /// Previously recorded attempts for the current user.
    async fn attempt_history(&self) -> anyhow::Result<Vec<AttemptSummary>>;
}

/// One row of remote attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub quiz_id: Option<serde_json::Value>,
    #[serde(default)]
    pub quiz_title: Option<String>,
    /// Score as stored by the server: a 0-1 fraction for attempts this
    /// client records, a percentage for some older rows.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub time_spent: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

impl AttemptSummary {
    /// The score as a whole percentage. Values up to 1 are read as fractions.
    pub fn score_percent(&self) -> Option<u32> {
        let score = self.score?;
        if !score.is_finite() || score < 0.0 {
            return None;
        }
        let percent = if score <= 1.0 { score * 100.0 } else { score };
        Some(percent.round() as u32)
    }
}

// ---------------------------------------------------------------------------
// Attempt sink
// ---------------------------------------------------------------------------

/// Where finished attempts are sent.
#[async_trait]
pub trait AttemptSink: Send + Sync {
    /// Submit raw answers for remote validation.
    async fn submit_answers(&self, submission: &AnswerSubmission) -> anyhow::Result<SubmissionAck>;

    /// Record an attempt in remote history.
    async fn save_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()>;
}

/// Payload for the validation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub document_id: serde_json::Value,
    pub answers: Vec<SubmittedAnswer>,
}

/// A single answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    /// The question id (questions are called quizzes by the backend).
    pub quiz_id: serde_json::Value,
    pub selected_option_index: serde_json::Value,
    /// Seconds to first answer, 0 when unknown.
    pub time_taken: u32,
}

/// Acknowledgement from the validation endpoint.
///
/// The remote score is parsed for logging only; the local score is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAck {
    #[serde(default)]
    pub quiz_session_id: Option<i64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub correct_count: Option<u32>,
    #[serde(default)]
    pub questions_answered: Option<u32>,
}

/// Payload for the attempt-history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub document_id: serde_json::Value,
    pub quiz_id: serde_json::Value,
    pub quiz_title: String,
    /// Fraction in `[0, 1]`.
    pub score: f64,
    pub correct_answers: usize,
    pub total_questions: usize,
    /// Seconds, clamped to the time limit.
    pub time_spent: u32,
    pub date: DateTime<Utc>,
    /// Omitted from the reduced payload sent after a failed validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<SubmittedAnswer>>,
}

/// Encode an identifier the way the backend expects: integers as numbers, anything else as text.
pub fn wire_id(id: &str) -> serde_json::Value {
    match id.trim().parse::<i64>() {
        Ok(n) => serde_json::Value::from(n),
        Err(_) => serde_json::Value::from(id),
    }
}
