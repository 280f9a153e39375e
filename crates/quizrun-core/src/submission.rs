//! Submission coordinator.
//!
//! Finalizes a session exactly once: scores locally, attempts the validation
//! and history calls independently, clears persisted progress, and freezes
//! the session. Remote failures are captured in a [`SubmissionOutcome`] and
//! never keep the user from their results.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Quiz, ResultsRecord, SessionState};
use crate::scoring::{clamp_time_spent, score_attempt, score_fraction};
use crate::session::{QuizSession, SubmitTrigger};
use crate::store::SessionStore;
use crate::traits::{wire_id, AnswerSubmission, AttemptRecord, AttemptSink, SubmittedAnswer};

/// How one remote call went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum RemoteOutcome {
    Delivered,
    Failed(String),
}

impl RemoteOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RemoteOutcome::Delivered)
    }
}

/// Aggregated result of the two remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub validation: RemoteOutcome,
    pub history: RemoteOutcome,
    /// True when the history record was sent without raw answers.
    pub reduced_history_payload: bool,
}

/// A finished attempt.
#[derive(Debug, Clone)]
pub struct FinalizedAttempt {
    pub trigger: SubmitTrigger,
    pub results: ResultsRecord,
    pub outcome: SubmissionOutcome,
}

/// Pushes finished attempts to the remote endpoints.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    sink: Arc<dyn AttemptSink>,
}

impl SubmissionCoordinator {
    pub fn new(sink: Arc<dyn AttemptSink>) -> Self {
        Self { sink }
    }

    /// Finalize the session.
    ///
    /// Returns `None` without side effects when another submission already
    /// claimed the session.
    pub async fn finalize(
        &self,
        session: &mut QuizSession,
        store: &SessionStore,
        trigger: SubmitTrigger,
    ) -> Option<FinalizedAttempt> {
        let ticket = session.begin_submit(trigger)?;
        let quiz = session.quiz().clone();
        let state = session.state().clone();

        let results = score_attempt(&quiz, &state.selected_answers, state.time_left_seconds);
        tracing::info!(
            "submitting quiz {} ({trigger:?}): {}/{} correct, score {}%",
            quiz.id,
            results.correct_count,
            results.total_questions,
            results.score
        );

        let answers = submitted_answers(&state);
        let outcome = self.push(&quiz, &results, answers, Utc::now()).await;

        if let Err(e) = store.clear(&quiz.id) {
            tracing::warn!("failed to clear saved progress for {}: {e}", quiz.id);
        }
        session.complete(ticket, results.clone());

        Some(FinalizedAttempt {
            trigger,
            results,
            outcome,
        })
    }

    async fn push(
        &self,
        quiz: &Quiz,
        results: &ResultsRecord,
        answers: Vec<SubmittedAnswer>,
        now: DateTime<Utc>,
    ) -> SubmissionOutcome {
        let submission = AnswerSubmission {
            document_id: wire_id(&quiz.source_id),
            answers: answers.clone(),
        };

        let validation = match self.sink.submit_answers(&submission).await {
            Ok(ack) => {
                // The remote score is unreliable; the local one is shown.
                tracing::debug!(
                    "validation accepted (session {:?}, remote score {:?}, local score {})",
                    ack.quiz_session_id,
                    ack.score,
                    results.score
                );
                RemoteOutcome::Delivered
            }
            Err(e) => {
                tracing::error!("answer validation failed for quiz {}: {e:#}", quiz.id);
                RemoteOutcome::Failed(format!("{e:#}"))
            }
        };

        let reduced = !validation.is_delivered();
        let record = AttemptRecord {
            document_id: wire_id(&quiz.source_id),
            quiz_id: wire_id(&quiz.id),
            quiz_title: quiz.title.clone(),
            score: score_fraction(results.score),
            correct_answers: results.correct_count,
            total_questions: results.total_questions,
            time_spent: clamp_time_spent(results.time_taken_seconds, quiz.time_limit_secs),
            date: now,
            answers: (!reduced).then_some(answers),
        };

        let history = match self.sink.save_attempt(&record).await {
            Ok(()) => {
                tracing::info!("attempt saved to history for quiz {}", quiz.id);
                RemoteOutcome::Delivered
            }
            Err(e) => {
                tracing::error!("failed to save attempt history for quiz {}: {e:#}", quiz.id);
                RemoteOutcome::Failed(format!("{e:#}"))
            }
        };

        SubmissionOutcome {
            validation,
            history,
            reduced_history_payload: reduced,
        }
    }
}

/// Raw answers in wire shape, with first-answer timing (0 when unknown).
pub fn submitted_answers(state: &SessionState) -> Vec<SubmittedAnswer> {
    state
        .selected_answers
        .iter()
        .map(|(question_id, answer)| SubmittedAnswer {
            quiz_id: wire_id(question_id),
            selected_option_index: wire_id(answer),
            time_taken: state
                .per_question_elapsed_seconds
                .get(question_id)
                .copied()
                .unwrap_or(0),
        })
        .collect()
}
