//! The `quizrun take` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;

use quizrun_api::HttpBackend;
use quizrun_core::driver::SessionDriver;
use quizrun_core::error::LoadError;
use quizrun_core::loader::QuizLoader;
use quizrun_core::session::QuizSession;
use quizrun_core::submission::SubmissionCoordinator;

use super::{interactive, Settings};

pub async fn execute(source: String, settings: Settings) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(&settings.config.api)?);
    let store = settings.open_store()?;
    let loader = QuizLoader::new(backend.clone(), settings.config.session.loader_config());

    eprintln!("Loading quiz for document {source}...");
    let load = match loader.load_progressive(&source).await {
        Ok(load) => load,
        Err(e) => {
            if let Some(hint) = retry_hint(&e, &source) {
                eprintln!("{hint}");
            }
            return Err(e.into());
        }
    };
    let total = load.total();

    // Saved answers may refer to any question, so resuming needs the whole set.
    let (session, updates) = match store.restore(&source) {
        Some(progress) => {
            println!("Resuming your previous attempt.");
            (QuizSession::resume(load.into_complete(), progress), None)
        }
        None => {
            let mut batches = load.into_stream().boxed();
            let first = batches
                .next()
                .await
                .context("quiz loader produced no questions")?;
            (QuizSession::start(first), Some(batches))
        }
    };

    println!(
        "{}: {total} questions, {} to finish.",
        session.quiz().title,
        quizrun_core::clock::format_clock(session.state().time_left_seconds)
    );

    let driver = SessionDriver::new(
        store,
        SubmissionCoordinator::new(backend),
        settings.config.session.autosave_policy(),
    );
    let exit = interactive::run(driver, session, updates).await;
    interactive::report(&exit);
    Ok(())
}

/// What to tell the user after a failed load, when trying again may help.
fn retry_hint(err: &LoadError, source: &str) -> Option<String> {
    err.is_retryable().then(|| {
        format!("The quiz could not be loaded right now. Run `quizrun take --source {source}` again to retry.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures_suggest_retry() {
        let hint = retry_hint(&LoadError::Network("connection refused".into()), "7").unwrap();
        assert!(hint.contains("quizrun take --source 7"));

        let backend = LoadError::Backend {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(retry_hint(&backend, "7").is_some());
    }

    #[test]
    fn permanent_failures_do_not() {
        assert!(retry_hint(&LoadError::NotFound, "7").is_none());
        assert!(retry_hint(&LoadError::Forbidden, "7").is_none());
        assert!(retry_hint(&LoadError::NoQuestions, "7").is_none());
    }
}
