//! The `quizrun history` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizrun_api::HttpBackend;
use quizrun_core::clock::format_clock;
use quizrun_core::traits::{AttemptSummary, QuizSource};

use super::Settings;

pub async fn execute(settings: Settings) -> Result<()> {
    let backend = HttpBackend::new(&settings.config.api)?;
    let attempts = backend.attempt_history().await?;

    if attempts.is_empty() {
        println!("No quiz attempts yet.");
        return Ok(());
    }

    println!("{}", render_history(&attempts));
    Ok(())
}

fn render_history(attempts: &[AttemptSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Quiz", "Score", "Correct", "Time"]);

    for attempt in attempts {
        let date = attempt
            .date
            .as_deref()
            .map(|d| d.chars().take(10).collect::<String>())
            .unwrap_or_else(|| "-".into());
        let correct = match (attempt.correct_answers, attempt.total_questions) {
            (Some(c), Some(t)) => format!("{c}/{t}"),
            _ => "-".into(),
        };
        table.add_row(vec![
            Cell::new(date),
            Cell::new(attempt.quiz_title.as_deref().unwrap_or("Untitled quiz")),
            Cell::new(
                attempt
                    .score_percent()
                    .map(|s| format!("{s}%"))
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(correct),
            Cell::new(
                attempt
                    .time_spent
                    .map(|t| format_clock(t.max(0.0) as u32))
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }

    table
}
