//! In-process backend for tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use quizrun_core::error::ApiError;
use quizrun_core::traits::{
    AnswerSubmission, AttemptRecord, AttemptSink, AttemptSummary, QuizSource, SubmissionAck,
};

/// A scripted backend that keeps everything in memory.
///
/// Saved attempts are replayed by [`QuizSource::attempt_history`], so a demo
/// session shows up in history like a real one would.
#[derive(Default)]
pub struct MockBackend {
    /// Raw question records keyed by source id.
    questions: HashMap<String, Vec<Value>>,
    fail_submit: AtomicBool,
    fail_history: AtomicBool,
    fetch_count: AtomicU32,
    submit_count: AtomicU32,
    save_count: AtomicU32,
    submissions: Mutex<Vec<AnswerSubmission>>,
    attempts: Mutex<Vec<AttemptRecord>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `questions` for `source_id`.
    pub fn with_questions(mut self, source_id: &str, questions: Vec<Value>) -> Self {
        self.questions.insert(source_id.to_string(), questions);
        self
    }

    /// Make the validation endpoint fail.
    pub fn fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::Relaxed);
    }

    /// Make the history endpoint fail (both reads and writes).
    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::Relaxed);
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count.load(Ordering::Relaxed)
    }

    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }

    /// Submissions received so far.
    pub fn submissions(&self) -> Vec<AnswerSubmission> {
        self.submissions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Attempts recorded so far.
    pub fn attempts(&self) -> Vec<AttemptRecord> {
        self.attempts.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QuizSource for MockBackend {
    async fn fetch_questions(&self, source_id: &str) -> anyhow::Result<Vec<Value>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.questions
            .get(source_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/quizzes/{source_id}/")).into())
    }

    async fn attempt_history(&self) -> anyhow::Result<Vec<AttemptSummary>> {
        if self.fail_history.load(Ordering::Relaxed) {
            return Err(ApiError::Network("mock history unavailable".into()).into());
        }
        let attempts = self.attempts();
        Ok(attempts
            .iter()
            .enumerate()
            .map(|(i, a)| AttemptSummary {
                id: Some(i as i64 + 1),
                quiz_id: Some(a.quiz_id.clone()),
                quiz_title: Some(a.quiz_title.clone()),
                score: Some(a.score),
                correct_answers: Some(a.correct_answers as u32),
                total_questions: Some(a.total_questions as u32),
                time_spent: Some(f64::from(a.time_spent)),
                date: Some(a.date.to_rfc3339()),
            })
            .collect())
    }
}

#[async_trait]
impl AttemptSink for MockBackend {
    async fn submit_answers(&self, submission: &AnswerSubmission) -> anyhow::Result<SubmissionAck> {
        self.submit_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push(submission.clone());
        }
        if self.fail_submit.load(Ordering::Relaxed) {
            return Err(ApiError::Api {
                status: 500,
                message: "mock validation failure".into(),
            }
            .into());
        }
        Ok(SubmissionAck {
            quiz_session_id: Some(i64::from(self.submit_count())),
            // Mirrors the real backend, which reports a zero score.
            score: Some(0.0),
            correct_count: Some(0),
            questions_answered: Some(submission.answers.len() as u32),
        })
    }

    async fn save_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()> {
        self.save_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_history.load(Ordering::Relaxed) {
            return Err(ApiError::Network("mock history unavailable".into()).into());
        }
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(record.clone());
        }
        Ok(())
    }
}
