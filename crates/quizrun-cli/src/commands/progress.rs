//! The `quizrun progress` command.

use anyhow::Result;

use quizrun_core::clock::format_clock;

use super::Settings;

pub fn execute(quiz: String, clear: bool, settings: Settings) -> Result<()> {
    let store = settings.open_store()?;

    if clear {
        store.clear(&quiz)?;
        println!("Cleared saved progress for quiz {quiz}.");
        return Ok(());
    }

    match store.restore(&quiz) {
        Some(progress) => {
            println!("Saved progress for quiz {quiz}:");
            println!("  Answered:         {}", progress.selected_answers.len());
            println!("  Current question: {}", progress.current_question_index + 1);
            println!("  Time left:        {}", format_clock(progress.time_left));
        }
        None => println!("No saved progress for quiz {quiz}."),
    }
    Ok(())
}
