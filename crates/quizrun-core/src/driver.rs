//! Session driver.
//!
//! Runs one attempt to completion on a single task: commands from the host,
//! the one-second countdown, the autosave heartbeat and the debounced save are
//! all multiplexed in one `select!` loop, so session state is never shared.
//! Dropping out of the loop (teardown or finalize) cancels every timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};

use crate::clock::Tick;
use crate::error::SessionError;
use crate::model::{Quiz, SessionState};
use crate::session::{QuizSession, SubmitTrigger};
use crate::store::{AutosavePolicy, SessionStore};
use crate::submission::{FinalizedAttempt, SubmissionCoordinator};

const TICK: Duration = Duration::from_secs(1);

/// Input from the host.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Select { question_id: String, option: usize },
    SelectCurrent(usize),
    Next,
    Previous,
    GoTo(usize),
    /// A larger snapshot from a progressive load.
    Extend(Quiz),
    Submit,
    /// Leave without submitting. Pending debounced saves are dropped.
    Teardown,
}

/// Hooks for rendering session progress.
pub trait SessionObserver: Send + Sync {
    fn on_changed(&self, session: &QuizSession);
    fn on_tick(&self, remaining: u32, running_low: bool);
    fn on_rejected(&self, error: &SessionError);
    fn on_saved(&self, state: &SessionState);
    fn on_expired(&self);
    fn on_finalized(&self, attempt: &FinalizedAttempt);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_changed(&self, _: &QuizSession) {}
    fn on_tick(&self, _: u32, _: bool) {}
    fn on_rejected(&self, _: &SessionError) {}
    fn on_saved(&self, _: &SessionState) {}
    fn on_expired(&self) {}
    fn on_finalized(&self, _: &FinalizedAttempt) {}
}

/// How a run ended.
#[derive(Debug)]
pub enum SessionExit {
    Finalized {
        session: QuizSession,
        attempt: FinalizedAttempt,
    },
    Abandoned {
        session: QuizSession,
    },
}

impl SessionExit {
    pub fn session(&self) -> &QuizSession {
        match self {
            SessionExit::Finalized { session, .. } | SessionExit::Abandoned { session } => session,
        }
    }

    pub fn attempt(&self) -> Option<&FinalizedAttempt> {
        match self {
            SessionExit::Finalized { attempt, .. } => Some(attempt),
            SessionExit::Abandoned { .. } => None,
        }
    }
}

/// Drives a [`QuizSession`] against wall-clock time.
#[derive(Clone)]
pub struct SessionDriver {
    store: SessionStore,
    coordinator: SubmissionCoordinator,
    policy: AutosavePolicy,
}

impl SessionDriver {
    pub fn new(store: SessionStore, coordinator: SubmissionCoordinator, policy: AutosavePolicy) -> Self {
        Self {
            store,
            coordinator,
            policy,
        }
    }

    /// Run until the session is submitted (by the user or by expiry) or torn
    /// down. A closed command channel counts as teardown.
    pub async fn run(
        &self,
        mut session: QuizSession,
        mut commands: mpsc::Receiver<SessionCommand>,
        observer: &dyn SessionObserver,
    ) -> SessionExit {
        let start = Instant::now();
        let mut clock = interval_at(start + TICK, TICK);
        let mut heartbeat = interval_at(start + self.policy.heartbeat, self.policy.heartbeat);
        let debounce = tokio::time::sleep(self.policy.debounce);
        tokio::pin!(debounce);
        let mut save_pending = false;

        observer.on_changed(&session);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let command = command.unwrap_or(SessionCommand::Teardown);
                    match command {
                        SessionCommand::Submit => {
                            return self.finish(session, SubmitTrigger::User, observer).await;
                        }
                        SessionCommand::Teardown => {
                            if save_pending {
                                tracing::debug!("teardown dropped a pending save for {}", session.quiz().id);
                            }
                            return SessionExit::Abandoned { session };
                        }
                        SessionCommand::Extend(quiz) => {
                            session.extend_quiz(quiz);
                            observer.on_changed(&session);
                        }
                        other => match apply(&mut session, other) {
                            Ok(()) => {
                                if session.is_dirty() {
                                    debounce.as_mut().reset(Instant::now() + self.policy.debounce);
                                    save_pending = true;
                                }
                                observer.on_changed(&session);
                            }
                            Err(e) => {
                                tracing::debug!("rejected command: {e}");
                                observer.on_rejected(&e);
                            }
                        },
                    }
                }
                _ = clock.tick() => {
                    match session.tick() {
                        Tick::Running(remaining) => observer.on_tick(remaining, session.is_running_low()),
                        Tick::Expired => {
                            observer.on_expired();
                            return self.finish(session, SubmitTrigger::Expiry, observer).await;
                        }
                        Tick::Idle => {}
                    }
                }
                _ = heartbeat.tick() => {
                    self.save(&mut session, observer);
                }
                _ = &mut debounce, if save_pending => {
                    save_pending = false;
                    self.save(&mut session, observer);
                }
            }
        }
    }

    fn save(&self, session: &mut QuizSession, observer: &dyn SessionObserver) {
        if !session.is_active() {
            return;
        }
        match self.store.save(session.state()) {
            Ok(()) => {
                session.mark_saved();
                observer.on_saved(session.state());
            }
            Err(e) => tracing::warn!("autosave failed for {}: {e}", session.quiz().id),
        }
    }

    async fn finish(
        &self,
        mut session: QuizSession,
        trigger: SubmitTrigger,
        observer: &dyn SessionObserver,
    ) -> SessionExit {
        match self.coordinator.finalize(&mut session, &self.store, trigger).await {
            Some(attempt) => {
                observer.on_finalized(&attempt);
                SessionExit::Finalized { session, attempt }
            }
            None => SessionExit::Abandoned { session },
        }
    }
}

fn apply(session: &mut QuizSession, command: SessionCommand) -> Result<(), SessionError> {
    match command {
        SessionCommand::Select { question_id, option } => session.select_answer(&question_id, option),
        SessionCommand::SelectCurrent(option) => session.select_current(option),
        SessionCommand::Next => {
            session.next();
            Ok(())
        }
        SessionCommand::Previous => {
            session.previous();
            Ok(())
        }
        SessionCommand::GoTo(index) => session.go_to(index),
        SessionCommand::Extend(_) | SessionCommand::Submit | SessionCommand::Teardown => Ok(()),
    }
}
