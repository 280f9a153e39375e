//! The quiz session state machine.
//!
//! All mutation goes through named transitions: [`QuizSession::select_answer`],
//! navigation, [`QuizSession::tick`], [`QuizSession::begin_submit`] and
//! [`QuizSession::complete`]. Nothing here performs I/O.

use chrono::{DateTime, Utc};

use crate::clock::{ClockPhase, Countdown, Tick};
use crate::error::SessionError;
use crate::model::{PersistedProgress, Question, Quiz, ResultsRecord, SessionState};

/// What caused a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The user asked to submit.
    User,
    /// The countdown reached zero.
    Expiry,
}

/// Proof that the caller holds the single in-flight submission.
#[derive(Debug)]
#[must_use = "a submit ticket must be completed"]
pub struct SubmitTicket {
    pub trigger: SubmitTrigger,
    pub(crate) _private: (),
}

/// A single attempt at a quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    state: SessionState,
    clock: Countdown,
    submitting: bool,
    dirty: bool,
    results: Option<ResultsRecord>,
}

impl QuizSession {
    /// Start a fresh attempt.
    pub fn start(quiz: Quiz) -> Self {
        Self::start_at(quiz, Utc::now())
    }

    pub fn start_at(quiz: Quiz, now: DateTime<Utc>) -> Self {
        let state = SessionState::fresh(&quiz);
        let clock = Countdown::new(state.time_left_seconds);
        let mut session = Self {
            quiz,
            state,
            clock,
            submitting: false,
            dirty: false,
            results: None,
        };
        session.mark_shown(now);
        session
    }

    /// Start from persisted progress if it is usable, otherwise fresh.
    pub fn resume_or_start(quiz: Quiz, progress: Option<PersistedProgress>) -> Self {
        match progress {
            Some(p) => Self::resume(quiz, p),
            None => Self::start(quiz),
        }
    }

    /// Apply persisted progress to a new attempt.
    ///
    /// Answers for unknown questions or out-of-range options are dropped, the
    /// question index is clamped, and a stored `timeLeft` of 0 is treated as
    /// absent. Per-question timing restarts.
    pub fn resume(quiz: Quiz, progress: PersistedProgress) -> Self {
        Self::resume_at(quiz, progress, Utc::now())
    }

    pub fn resume_at(quiz: Quiz, progress: PersistedProgress, now: DateTime<Utc>) -> Self {
        let mut state = SessionState::fresh(&quiz);

        state.selected_answers = progress
            .selected_answers
            .into_iter()
            .filter(|(qid, answer)| match quiz.question(qid) {
                Some(q) => is_valid_answer(q, answer),
                None => false,
            })
            .collect();

        if !quiz.is_empty() {
            state.current_question_index = progress.current_question_index.min(quiz.len() - 1);
        }

        if progress.time_left > 0 {
            state.time_left_seconds = progress.time_left.min(quiz.time_limit_secs);
        }

        let clock = Countdown::new(state.time_left_seconds);
        let mut session = Self {
            quiz,
            state,
            clock,
            submitting: false,
            dirty: false,
            results: None,
        };
        session.mark_shown(now);
        session
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn clock_phase(&self) -> ClockPhase {
        self.clock.phase()
    }

    pub fn is_running_low(&self) -> bool {
        self.clock.is_running_low()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.state.current_question_index)
    }

    pub fn selected_for(&self, question_id: &str) -> Option<&str> {
        self.state.selected_answers.get(question_id).map(String::as_str)
    }

    pub fn is_submitted(&self) -> bool {
        self.state.submitted
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Accepts input only before submission starts.
    pub fn is_active(&self) -> bool {
        !self.state.submitted && !self.submitting
    }

    pub fn results(&self) -> Option<&ResultsRecord> {
        self.results.as_ref()
    }

    /// Whether state changed since the last [`QuizSession::mark_saved`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Replace the quiz with a larger snapshot of the same quiz (progressive loading).
    pub fn extend_quiz(&mut self, quiz: Quiz) {
        if quiz.id == self.quiz.id && quiz.len() >= self.quiz.len() {
            self.quiz = quiz;
        }
    }

    // -- transitions ---------------------------------------------------------

    /// Record an answer for a question.
    pub fn select_answer(&mut self, question_id: &str, option_index: usize) -> Result<(), SessionError> {
        self.select_answer_at(question_id, option_index, Utc::now())
    }

    pub fn select_answer_at(
        &mut self,
        question_id: &str,
        option_index: usize,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::Frozen);
        }
        let question = self
            .quiz
            .question(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))?;
        if option_index >= question.options.len() {
            return Err(SessionError::OptionOutOfRange {
                question_id: question_id.to_string(),
                index: option_index,
                count: question.options.len(),
            });
        }

        if !self.state.per_question_elapsed_seconds.contains_key(question_id) {
            if let Some(started) = self.state.per_question_started_at.get(question_id) {
                let millis = (now - *started).num_milliseconds().max(0);
                let secs = ((millis + 500) / 1000) as u32;
                self.state
                    .per_question_elapsed_seconds
                    .insert(question_id.to_string(), secs);
            }
        }

        self.state
            .selected_answers
            .insert(question_id.to_string(), option_index.to_string());
        self.dirty = true;
        Ok(())
    }

    /// Answer the current question.
    pub fn select_current(&mut self, option_index: usize) -> Result<(), SessionError> {
        let id = self
            .current_question()
            .map(|q| q.id.clone())
            .ok_or(SessionError::IndexOutOfRange {
                index: self.state.current_question_index,
                count: self.quiz.len(),
            })?;
        self.select_answer(&id, option_index)
    }

    /// Move to the next question. Returns false at the end.
    pub fn next(&mut self) -> bool {
        let target = self.state.current_question_index + 1;
        target < self.quiz.len() && self.go_to(target).is_ok()
    }

    /// Move to the previous question. Returns false at the start.
    pub fn previous(&mut self) -> bool {
        match self.state.current_question_index.checked_sub(1) {
            Some(target) => self.go_to(target).is_ok(),
            None => false,
        }
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.go_to_at(index, Utc::now())
    }

    pub fn go_to_at(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::Frozen);
        }
        if index >= self.quiz.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                count: self.quiz.len(),
            });
        }
        if index != self.state.current_question_index {
            self.state.current_question_index = index;
            self.dirty = true;
        }
        self.mark_shown(now);
        Ok(())
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if !self.is_active() {
            return Tick::Idle;
        }
        let tick = self.clock.tick();
        self.state.time_left_seconds = self.clock.remaining();
        if matches!(tick, Tick::Expired) {
            tracing::info!("time is up for quiz {}", self.quiz.id);
        }
        tick
    }

    /// Claim the single submission. Returns `None` when a submission is
    /// already in flight or finished.
    pub fn begin_submit(&mut self, trigger: SubmitTrigger) -> Option<SubmitTicket> {
        if !self.is_active() {
            tracing::debug!("ignoring {trigger:?} submit: already submitting or submitted");
            return None;
        }
        self.submitting = true;
        self.clock.stop();
        Some(SubmitTicket {
            trigger,
            _private: (),
        })
    }

    /// Finish the submission: store results and freeze the session.
    pub fn complete(&mut self, ticket: SubmitTicket, results: ResultsRecord) {
        let SubmitTicket { trigger, .. } = ticket;
        tracing::debug!("session {} completed via {trigger:?}", self.quiz.id);
        self.state.submitted = true;
        self.submitting = false;
        self.dirty = false;
        self.results = Some(results);
    }

    fn mark_shown(&mut self, now: DateTime<Utc>) {
        if let Some(id) = self.current_question().map(|q| q.id.clone()) {
            self.state.per_question_started_at.entry(id).or_insert(now);
        }
    }
}

fn is_valid_answer(question: &Question, answer: &str) -> bool {
    answer
        .parse::<usize>()
        .map(|i| i < question.options.len())
        .unwrap_or(false)
}
