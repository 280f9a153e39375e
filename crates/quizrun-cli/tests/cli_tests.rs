//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quizrun(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizrun").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("QUIZRUN_API_URL")
        .env_remove("QUIZRUN_API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn write_progress(dir: &Path, quiz_id: &str, body: serde_json::Value) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join(format!("quiz_progress_{quiz_id}.json")),
        body.to_string(),
    )
    .unwrap();
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    quizrun(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("take"))
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("progress"));
}

#[test]
fn progress_on_empty_storage() {
    let home = TempDir::new().unwrap();
    let storage = home.path().join("progress");

    quizrun(home.path())
        .args(["progress", "--quiz", "7", "--storage-dir"])
        .arg(&storage)
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved progress for quiz 7."));
}

#[test]
fn progress_shows_and_clears_saved_record() {
    let home = TempDir::new().unwrap();
    let storage = home.path().join("progress");
    write_progress(
        &storage,
        "7",
        serde_json::json!({
            "selectedAnswers": {"1": "0", "2": "3"},
            "currentQuestionIndex": 4,
            "timeLeft": 95,
            "quizSubmitted": false
        }),
    );

    quizrun(home.path())
        .args(["progress", "--quiz", "7", "--storage-dir"])
        .arg(&storage)
        .assert()
        .success()
        .stdout(predicate::str::contains("Answered:         2"))
        .stdout(predicate::str::contains("Current question: 5"))
        .stdout(predicate::str::contains("Time left:        1:35"));

    quizrun(home.path())
        .args(["progress", "--quiz", "7", "--clear", "--storage-dir"])
        .arg(&storage)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared saved progress"));

    assert!(!storage.join("quiz_progress_7.json").exists());
}

#[test]
fn demo_submit_prints_results() {
    let home = TempDir::new().unwrap();
    let storage = home.path().join("progress");

    quizrun(home.path())
        .arg("demo")
        .arg("--storage-dir")
        .arg(&storage)
        .write_stdin("2\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo Quiz: Technology & Innovation"))
        .stdout(predicate::str::contains("Score: 20%  (1/5 correct)"))
        .stdout(predicate::str::contains("B. OpenAI"))
        .stdout(predicate::str::contains("You did not answer this question."));

    assert!(!storage.join("quiz_progress_demo-quiz.json").exists());
}

#[test]
fn demo_resumes_saved_progress() {
    let home = TempDir::new().unwrap();
    let storage = home.path().join("progress");
    write_progress(
        &storage,
        "demo-quiz",
        serde_json::json!({
            "selectedAnswers": {"q1": "1", "q2": "0", "q3": "1"},
            "currentQuestionIndex": 3,
            "timeLeft": 120,
            "quizSubmitted": false
        }),
    );

    quizrun(home.path())
        .arg("demo")
        .arg("--storage-dir")
        .arg(&storage)
        .write_stdin("s\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resuming your previous attempt."))
        .stdout(predicate::str::contains("Question 4/5"))
        .stdout(predicate::str::contains("Score: 60%  (3/5 correct)  Time taken: 3:00"));
}

#[test]
fn demo_ignores_submitted_progress() {
    let home = TempDir::new().unwrap();
    let storage = home.path().join("progress");
    write_progress(
        &storage,
        "demo-quiz",
        serde_json::json!({
            "selectedAnswers": {"q1": "1"},
            "currentQuestionIndex": 2,
            "timeLeft": 100,
            "quizSubmitted": true
        }),
    );

    quizrun(home.path())
        .arg("demo")
        .arg("--storage-dir")
        .arg(&storage)
        .write_stdin("s\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resuming").not())
        .stdout(predicate::str::contains("Score: 0%  (0/5 correct)"));
}

#[test]
fn demo_quit_leaves_without_submitting() {
    let home = TempDir::new().unwrap();

    quizrun(home.path())
        .arg("demo")
        .arg("--storage-dir")
        .arg(home.path().join("progress"))
        .write_stdin("1\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Left the quiz with 1 of 5 questions answered."))
        .stdout(predicate::str::contains("Score:").not());
}

#[test]
fn take_reports_unreachable_backend() {
    let home = TempDir::new().unwrap();

    quizrun(home.path())
        .env("QUIZRUN_API_URL", "http://127.0.0.1:9")
        .args(["take", "--source", "7", "--storage-dir"])
        .arg(home.path().join("progress"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network error"))
        .stderr(predicate::str::contains("again to retry"));
}

#[test]
fn missing_config_file_is_an_error() {
    let home = TempDir::new().unwrap();

    quizrun(home.path())
        .args(["progress", "--quiz", "7", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
