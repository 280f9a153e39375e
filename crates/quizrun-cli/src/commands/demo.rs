//! The `quizrun demo` command: the built-in quiz against an in-process backend.

use std::sync::Arc;

use anyhow::Result;

use quizrun_api::MockBackend;
use quizrun_core::clock::format_clock;
use quizrun_core::driver::SessionDriver;
use quizrun_core::model::demo_quiz;
use quizrun_core::session::QuizSession;
use quizrun_core::submission::SubmissionCoordinator;

use super::{interactive, Settings};

pub async fn execute(settings: Settings) -> Result<()> {
    let backend = Arc::new(MockBackend::new());
    let store = settings.open_store()?;
    let quiz = demo_quiz();

    println!(
        "{}: {} questions, {} to finish.",
        quiz.title,
        quiz.len(),
        format_clock(quiz.time_limit_secs)
    );
    let saved = store.restore(&quiz.id);
    if saved.is_some() {
        println!("Resuming your previous attempt.");
    }
    let session = QuizSession::resume_or_start(quiz, saved);

    let driver = SessionDriver::new(
        store,
        SubmissionCoordinator::new(backend.clone()),
        settings.config.session.autosave_policy(),
    );
    let exit = interactive::run(driver, session, None).await;
    interactive::report(&exit);

    tracing::debug!(
        "demo backend received {} submission(s), {} history record(s)",
        backend.submit_count(),
        backend.save_count()
    );
    Ok(())
}
