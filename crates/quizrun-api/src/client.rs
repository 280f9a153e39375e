//! HTTP backend for the question feed, answer validation and attempt history.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use quizrun_core::error::ApiError;
use quizrun_core::traits::{
    AnswerSubmission, AttemptRecord, AttemptSink, AttemptSummary, QuizSource, SubmissionAck,
};

use crate::cache::QuestionCache;
use crate::config::ApiConfig;

const SUBMIT_PATH: &str = "/quiz/submit/";

/// `reqwest`-based implementation of both collaborator ports.
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    history_path: String,
    timeout_secs: u64,
    cache: QuestionCache,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            history_path: config.history_path.clone(),
            timeout_secs: config.timeout_secs,
            cache: QuestionCache::new(config.cache_ttl()),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base}/quizzes/{source_id}/` with the id escaped as one path segment.
    fn questions_url(&self, source_id: &str) -> Result<String, ApiError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ApiError::Network(format!("invalid base URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Network(format!("base URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["quizzes", source_id, ""]);
        Ok(url.to_string())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(self.timeout_secs)
                } else {
                    ApiError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        Err(match status {
            401 | 403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(url.to_string()),
            _ => ApiError::Api { status, message },
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Prefer the backend's `{"error": ...}` or `{"detail": ...}` message over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "detail"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl QuizSource for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch_questions(&self, source_id: &str) -> anyhow::Result<Vec<Value>> {
        if let Some(cached) = self.cache.get(source_id) {
            return Ok(cached);
        }

        let url = self.questions_url(source_id)?;
        let response = self.send(self.client.get(&url), &url).await?;
        let body: Value = Self::decode(response).await?;
        let Value::Array(questions) = body else {
            return Err(ApiError::Decode(format!("expected a list of questions from {url}")).into());
        };

        tracing::debug!("fetched {} raw questions for {source_id}", questions.len());
        self.cache.put(source_id, questions.clone());
        Ok(questions)
    }

    #[instrument(skip(self))]
    async fn attempt_history(&self) -> anyhow::Result<Vec<AttemptSummary>> {
        let url = self.url(&self.history_path);
        let response = match self.send(self.client.get(&url), &url).await {
            Ok(response) => response,
            // No attempts recorded yet.
            Err(ApiError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let body: Value = Self::decode(response).await?;
        let rows = match body {
            Value::Array(rows) => rows,
            Value::Object(mut obj) => match obj.remove("results") {
                Some(Value::Array(rows)) => rows,
                _ => return Err(ApiError::Decode("history response has no results".into()).into()),
            },
            _ => return Err(ApiError::Decode("unexpected history response".into()).into()),
        };

        let summaries = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<AttemptSummary>(row) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::warn!("skipping unreadable history row: {e}");
                    None
                }
            })
            .collect();
        Ok(summaries)
    }
}

#[async_trait]
impl AttemptSink for HttpBackend {
    #[instrument(skip(self, submission), fields(answers = submission.answers.len()))]
    async fn submit_answers(&self, submission: &AnswerSubmission) -> anyhow::Result<SubmissionAck> {
        let url = self.url(SUBMIT_PATH);
        let response = self.send(self.client.post(&url).json(submission), &url).await?;
        Ok(Self::decode(response).await?)
    }

    #[instrument(skip(self, record), fields(quiz_id = %record.quiz_id))]
    async fn save_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()> {
        let url = self.url(&self.history_path);
        self.send(self.client.post(&url).json(record), &url).await?;
        Ok(())
    }
}
