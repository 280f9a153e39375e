//! Error types for the quiz session engine.
//!
//! `ApiError` is defined here rather than in `quizrun-api` so the loader can
//! downcast collaborator failures and classify them without string matching.

use thiserror::Error;

/// Errors raised by a remote collaborator (question feed, submission or history endpoint).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to access the resource (HTTP 401/403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response format: {0}")]
    Decode(String),
}

/// Failures that prevent a quiz session from starting.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Quiz not found. The document might not have any quizzes generated yet.")]
    NotFound,

    #[error("You do not have permission to access this quiz.")]
    Forbidden,

    #[error("Network error. Please check your internet connection. ({0})")]
    Network(String),

    #[error("The quiz data is not in the expected format. Please try again.")]
    Malformed,

    #[error("No questions were found for this quiz.")]
    NoQuestions,

    #[error("An error occurred while loading the quiz (HTTP {status}): {message}")]
    Backend { status: u16, message: String },
}

impl LoadError {
    /// Classify a collaborator failure.
    ///
    /// Errors that are not an [`ApiError`] are treated as connectivity failures.
    pub fn classify(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ApiError>() {
            Some(ApiError::NotFound(_)) => LoadError::NotFound,
            Some(ApiError::Forbidden(_)) => LoadError::Forbidden,
            Some(ApiError::Decode(_)) => LoadError::Malformed,
            Some(ApiError::Timeout(secs)) => {
                LoadError::Network(format!("request timed out after {secs}s"))
            }
            Some(ApiError::Network(msg)) => LoadError::Network(msg.clone()),
            Some(ApiError::Api { status, message }) => LoadError::Backend {
                status: *status,
                message: message.clone(),
            },
            None => LoadError::Network(format!("{err:#}")),
        }
    }

    /// Whether retrying the load could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::Network(_) | LoadError::Backend { .. })
    }
}

/// Rejected session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    #[error("option {index} is out of range for question {question_id} ({count} options)")]
    OptionOutOfRange {
        question_id: String,
        index: usize,
        count: usize,
    },

    #[error("question index {index} is out of range ({count} questions)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("session is submitted and can no longer change")]
    Frozen,
}

/// Failures of the local durable storage port.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode progress for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}
