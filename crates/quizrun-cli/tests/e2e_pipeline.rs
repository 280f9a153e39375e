//! End-to-end pipeline tests against the in-process backend.
//!
//! These tests drive the whole engine (load → session → autosave → submit →
//! results) the way the CLI host does, without a terminal.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use quizrun_api::MockBackend;
use quizrun_core::driver::{NoopObserver, SessionCommand, SessionDriver, SessionExit};
use quizrun_core::error::LoadError;
use quizrun_core::loader::{LoaderConfig, QuizLoader};
use quizrun_core::presenter::{ResultsView, NOT_ANSWERED_MESSAGE};
use quizrun_core::session::{QuizSession, SubmitTrigger};
use quizrun_core::storage::{KeyValueStore, MemoryStore};
use quizrun_core::store::{AutosavePolicy, SessionStore};
use quizrun_core::submission::{RemoteOutcome, SubmissionCoordinator};
use quizrun_core::traits::QuizSource;

fn raw_questions(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                json!({
                    "id": 100 + i,
                    "question": format!("Question {i}?"),
                    "options": ["w", "x", "y", "z"],
                    "correct_option_index": i % 4,
                    "explanation": {"A": "A text", "B": "B text", "C": "C text", "D": "D text"}
                })
            } else {
                json!({
                    "id": format!("q{i}"),
                    "question_text": format!("Question {i}?"),
                    "options": ["w", "x", "y", "z"],
                    "answer": (i % 4).to_string(),
                    "hint_text": "think",
                    "explanation_text": "plain explanation"
                })
            }
        })
        .collect()
}

fn driver(backend: Arc<MockBackend>, storage: Arc<MemoryStore>) -> SessionDriver {
    SessionDriver::new(
        SessionStore::new(storage),
        SubmissionCoordinator::new(backend),
        AutosavePolicy::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn progressive_load_then_submit() {
    let backend = Arc::new(MockBackend::new().with_questions("42", raw_questions(12)));
    let storage = Arc::new(MemoryStore::new());
    let loader = QuizLoader::new(backend.clone(), LoaderConfig::default());

    let load = loader.load_progressive("42").await.unwrap();
    assert_eq!(load.total(), 12);
    let mut batches = load.into_stream().boxed();
    let first = batches.next().await.unwrap();
    assert_eq!(first.len(), 5);
    assert!(first.partially_loaded);

    let (tx, rx) = mpsc::channel(32);
    while let Some(snapshot) = batches.next().await {
        tx.send(SessionCommand::Extend(snapshot)).await.unwrap();
    }
    // Answer question 0 correctly (index 0) and question 11 ("q11", answer "3").
    tx.send(SessionCommand::SelectCurrent(0)).await.unwrap();
    tx.send(SessionCommand::GoTo(11)).await.unwrap();
    tx.send(SessionCommand::SelectCurrent(3)).await.unwrap();
    tx.send(SessionCommand::Submit).await.unwrap();

    let exit = driver(backend.clone(), storage.clone())
        .run(QuizSession::start(first), rx, &NoopObserver)
        .await;

    let SessionExit::Finalized { session, attempt } = exit else {
        panic!("expected a finalized session");
    };
    assert_eq!(session.quiz().len(), 12);
    assert!(!session.quiz().partially_loaded);
    assert_eq!(attempt.trigger, SubmitTrigger::User);
    assert_eq!(attempt.results.correct_count, 2);
    assert_eq!(attempt.results.total_questions, 12);
    assert_eq!(attempt.results.score, 17);
    assert_eq!(attempt.outcome.validation, RemoteOutcome::Delivered);

    // Integer ids go out as numbers, string ids as strings.
    let submission = &backend.submissions()[0];
    assert_eq!(submission.document_id, json!(42));
    let ids: Vec<&Value> = submission.answers.iter().map(|a| &a.quiz_id).collect();
    assert!(ids.contains(&&json!(100)));
    assert!(ids.contains(&&json!("q11")));

    let history = backend.attempt_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].quiz_title.as_deref(), Some("Quiz for Document #42"));
    assert!(storage.is_empty());

    let view = ResultsView::build(session.quiz(), &attempt.results);
    assert_eq!(view.questions[0].explanation, "A text");
    assert_eq!(view.questions[1].explanation, NOT_ANSWERED_MESSAGE);
    assert_eq!(view.questions[11].explanation, "plain explanation");
}

#[tokio::test(start_paused = true)]
async fn quit_and_resume_keeps_answers() {
    let backend = Arc::new(MockBackend::new().with_questions("7", raw_questions(5)));
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(storage.clone());
    let loader = QuizLoader::new(backend.clone(), LoaderConfig::default());

    // First visit: answer, wait for the debounced save, then leave.
    let quiz = loader.load("7").await.unwrap();
    let (tx, rx) = mpsc::channel(8);
    let first_visit = {
        let driver = driver(backend.clone(), storage.clone());
        let quiz = quiz.clone();
        tokio::spawn(async move { driver.run(QuizSession::start(quiz), rx, &NoopObserver).await })
    };
    tx.send(SessionCommand::SelectCurrent(0)).await.unwrap();
    tx.send(SessionCommand::Next).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    tx.send(SessionCommand::Teardown).await.unwrap();
    assert!(matches!(first_visit.await.unwrap(), SessionExit::Abandoned { .. }));

    let progress = store.restore("7").expect("progress was saved");
    assert_eq!(progress.current_question_index, 1);
    // Saved by the debounce 1.5 s in, after one countdown tick.
    assert_eq!(progress.time_left, 299);

    // Second visit resumes and submits.
    let session = QuizSession::resume(quiz, progress);
    assert_eq!(session.state().time_left_seconds, 299);
    let (tx, rx) = mpsc::channel(8);
    tx.send(SessionCommand::Submit).await.unwrap();
    let exit = driver(backend.clone(), storage.clone())
        .run(session, rx, &NoopObserver)
        .await;

    let attempt = exit.attempt().unwrap();
    assert_eq!(attempt.results.correct_count, 1);
    assert_eq!(attempt.results.time_taken_seconds, 1);
    assert!(storage.get("quiz_progress_7").unwrap().is_none());
}

#[tokio::test]
async fn validation_outage_still_records_history() {
    let backend = Arc::new(MockBackend::new().with_questions("9", raw_questions(3)));
    backend.fail_submit(true);
    let storage = Arc::new(MemoryStore::new());
    let quiz = QuizLoader::new(backend.clone(), LoaderConfig::default())
        .load("9")
        .await
        .unwrap();

    let (tx, rx) = mpsc::channel(8);
    tx.send(SessionCommand::SelectCurrent(0)).await.unwrap();
    tx.send(SessionCommand::Submit).await.unwrap();
    let exit = driver(backend.clone(), storage)
        .run(QuizSession::start(quiz), rx, &NoopObserver)
        .await;

    let attempt = exit.attempt().unwrap();
    assert!(matches!(attempt.outcome.validation, RemoteOutcome::Failed(_)));
    assert_eq!(attempt.outcome.history, RemoteOutcome::Delivered);
    assert!(attempt.outcome.reduced_history_payload);
    assert_eq!(attempt.results.score, 33);
    assert!(backend.attempts()[0].answers.is_none());
}

#[tokio::test]
async fn unknown_source_is_not_found() {
    let backend = Arc::new(MockBackend::new());
    let err = QuizLoader::new(backend, LoaderConfig::default())
        .load("404")
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::NotFound));
}
