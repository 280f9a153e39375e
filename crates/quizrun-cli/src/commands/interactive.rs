//! Terminal host for a running session: reads commands from stdin, renders
//! questions as the session changes and prints the results page.

use std::io::BufRead;
use std::sync::{Arc, Mutex};

use comfy_table::{Cell, Table};
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::mpsc;

use quizrun_core::clock::{format_clock, LOW_TIME_THRESHOLD_SECS};
use quizrun_core::driver::{SessionCommand, SessionDriver, SessionExit, SessionObserver};
use quizrun_core::error::SessionError;
use quizrun_core::model::{option_letter, Quiz, SessionState};
use quizrun_core::presenter::ResultsView;
use quizrun_core::session::QuizSession;
use quizrun_core::submission::{FinalizedAttempt, RemoteOutcome};

const HELP: &str = "Commands: 1-9 or a letter to answer, n next, p previous, g <n> go to question, h hint, s submit, q quit, ? help";

/// One line of user input.
#[derive(Debug)]
pub enum Input {
    Command(SessionCommand),
    Hint,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse an input line.
///
/// Lowercase command letters win over option letters; uppercase letters always
/// select an option.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Input::Empty;
    };

    match (head, parts.next()) {
        ("n", None) => Input::Command(SessionCommand::Next),
        ("p", None) => Input::Command(SessionCommand::Previous),
        ("s", None) => Input::Command(SessionCommand::Submit),
        ("h", None) => Input::Hint,
        ("q", None) => Input::Quit,
        ("?", None) | ("help", None) => Input::Help,
        ("g", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Command(SessionCommand::GoTo(n - 1)),
            _ => Input::Unknown(line.to_string()),
        },
        (token, None) => match token.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Command(SessionCommand::SelectCurrent(n - 1)),
            Ok(_) => Input::Unknown(line.to_string()),
            Err(_) => match letter_index(token) {
                Some(index) => Input::Command(SessionCommand::SelectCurrent(index)),
                None => Input::Unknown(line.to_string()),
            },
        },
        _ => Input::Unknown(line.to_string()),
    }
}

fn letter_index(token: &str) -> Option<usize> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

/// Renders session events to stdout.
#[derive(Default)]
pub struct ConsoleObserver {
    hint: Mutex<Option<String>>,
    last_rendered: Mutex<Option<(usize, Option<String>)>>,
}

impl ConsoleObserver {
    pub fn print_hint(&self) {
        match self.hint.lock().ok().and_then(|h| h.clone()) {
            Some(hint) => println!("Hint: {hint}"),
            None => println!("No question is shown yet."),
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_changed(&self, session: &QuizSession) {
        let Some(question) = session.current_question() else {
            return;
        };
        let state = session.state();
        let selected = session.selected_for(&question.id).map(str::to_string);
        let key = (state.current_question_index, selected.clone());

        if let Ok(mut last) = self.last_rendered.lock() {
            if last.as_ref() == Some(&key) {
                return;
            }
            *last = Some(key);
        }
        if let Ok(mut hint) = self.hint.lock() {
            *hint = Some(question.hint_or_default().to_string());
        }

        let quiz = session.quiz();
        let more = if quiz.partially_loaded { "+" } else { "" };
        println!();
        println!(
            "Question {}/{}{more}  [{} answered]  {} left",
            state.current_question_index + 1,
            quiz.len(),
            state.answered_count(),
            format_clock(state.time_left_seconds)
        );
        println!("{}", question.text);
        for (i, option) in question.options.iter().enumerate() {
            let marker = if selected.as_deref() == Some(i.to_string().as_str()) {
                "*"
            } else {
                " "
            };
            println!(" {marker} {}. {option}", option_letter(i));
        }
    }

    fn on_tick(&self, remaining: u32, running_low: bool) {
        let announce = remaining == LOW_TIME_THRESHOLD_SECS
            || (running_low && remaining > 0 && (remaining % 15 == 0 || remaining <= 5))
            || (remaining > 0 && remaining % 300 == 0);
        if announce {
            println!("Time left: {}", format_clock(remaining));
        }
    }

    fn on_rejected(&self, error: &SessionError) {
        println!("Not accepted: {error}");
    }

    fn on_saved(&self, _: &SessionState) {}

    fn on_expired(&self) {
        println!();
        println!("Time is up! Submitting your answers...");
    }

    fn on_finalized(&self, _: &FinalizedAttempt) {
        println!("Answers submitted.");
    }
}

/// Run `session` until it is submitted or the user quits.
///
/// `updates` delivers the remaining snapshots of a progressive load.
pub async fn run(
    driver: SessionDriver,
    session: QuizSession,
    updates: Option<BoxStream<'static, Quiz>>,
) -> SessionExit {
    let observer = Arc::new(ConsoleObserver::default());
    let (tx, rx) = mpsc::channel(32);

    println!("{HELP}");
    spawn_input_reader(tx.clone(), Arc::clone(&observer));

    if let Some(mut updates) = updates {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(quiz) = updates.next().await {
                if tx.send(SessionCommand::Extend(quiz)).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    driver.run(session, rx, observer.as_ref()).await
}

// A dedicated thread, so a blocked stdin read never holds up runtime shutdown.
fn spawn_input_reader(tx: mpsc::Sender<SessionCommand>, observer: Arc<ConsoleObserver>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let command = match parse_input(&line) {
                Input::Command(command) => command,
                Input::Quit => SessionCommand::Teardown,
                Input::Hint => {
                    observer.print_hint();
                    continue;
                }
                Input::Help => {
                    println!("{HELP}");
                    continue;
                }
                Input::Empty => continue,
                Input::Unknown(input) => {
                    println!("Unrecognized input '{input}'. Type ? for help.");
                    continue;
                }
            };
            let quit = matches!(command, SessionCommand::Teardown);
            if tx.blocking_send(command).is_err() || quit {
                break;
            }
        }
    });
}

/// Print the outcome of a run.
pub fn report(exit: &SessionExit) {
    match exit {
        SessionExit::Finalized { session, attempt } => {
            let view = ResultsView::build(session.quiz(), &attempt.results);
            println!();
            println!("{}", render_results(&view));
            if let RemoteOutcome::Failed(reason) = &attempt.outcome.validation {
                println!("Note: the server could not validate your answers ({reason}). Your local score is shown.");
            }
            if let RemoteOutcome::Failed(reason) = &attempt.outcome.history {
                println!("Note: this attempt was not saved to your history ({reason}).");
            }
        }
        SessionExit::Abandoned { session } => {
            println!();
            println!(
                "Left the quiz with {} of {} questions answered. Saved progress is offered next time.",
                session.state().answered_count(),
                session.quiz().len()
            );
        }
    }
}

/// The results page as text.
pub fn render_results(view: &ResultsView) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Result"]);
    for q in &view.questions {
        table.add_row(vec![
            Cell::new(q.number),
            Cell::new(&q.text),
            Cell::new(q.user_answer.as_deref().unwrap_or("Not answered")),
            Cell::new(&q.correct_answer),
            Cell::new(if q.is_correct { "correct" } else { "incorrect" }),
        ]);
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", view.title));
    out.push_str(&format!(
        "Score: {}%  ({}/{} correct)  Time taken: {}\n",
        view.score, view.correct_count, view.total_questions, view.time_taken
    ));
    out.push_str(&format!("{table}\n"));
    out.push_str("\nExplanations:\n");
    for q in &view.questions {
        out.push_str(&format!("{}. {}\n   {}\n", q.number, q.text, q.explanation));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizrun_core::model::demo_quiz;
    use quizrun_core::scoring::score_attempt;
    use std::collections::BTreeMap;

    fn command(line: &str) -> SessionCommand {
        match parse_input(line) {
            Input::Command(c) => c,
            other => panic!("expected a command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn digits_and_letters_select_options() {
        assert!(matches!(command("2"), SessionCommand::SelectCurrent(1)));
        assert!(matches!(command(" 1 "), SessionCommand::SelectCurrent(0)));
        assert!(matches!(command("c"), SessionCommand::SelectCurrent(2)));
        assert!(matches!(command("B"), SessionCommand::SelectCurrent(1)));
    }

    #[test]
    fn command_letters_take_precedence() {
        assert!(matches!(command("n"), SessionCommand::Next));
        assert!(matches!(command("p"), SessionCommand::Previous));
        assert!(matches!(command("s"), SessionCommand::Submit));
        assert!(matches!(command("N"), SessionCommand::SelectCurrent(13)));
        assert!(matches!(parse_input("h"), Input::Hint));
        assert!(matches!(parse_input("q"), Input::Quit));
    }

    #[test]
    fn go_to_is_one_based() {
        assert!(matches!(command("g 3"), SessionCommand::GoTo(2)));
        assert!(matches!(parse_input("g 0"), Input::Unknown(_)));
        assert!(matches!(parse_input("g"), Input::Unknown(_)));
    }

    #[test]
    fn junk_is_unknown() {
        assert!(matches!(parse_input("0"), Input::Unknown(_)));
        assert!(matches!(parse_input("hello"), Input::Unknown(_)));
        assert!(matches!(parse_input("   "), Input::Empty));
    }

    #[test]
    fn results_page_lists_every_question() {
        let quiz = demo_quiz();
        let mut answers = BTreeMap::new();
        answers.insert("q1".to_string(), "1".to_string());
        let view = ResultsView::build(&quiz, &score_attempt(&quiz, &answers, 297));

        let page = render_results(&view);
        assert!(page.contains("Score: 20%  (1/5 correct)  Time taken: 0:03"));
        assert!(page.contains("Not answered"));
        assert!(page.contains("B. OpenAI"));
        assert_eq!(page.matches("incorrect").count(), 4);
    }
}
