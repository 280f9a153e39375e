//! Results presentation: personalized explanations and a render-ready view
//! of a scored attempt.

use serde::Serialize;

use crate::clock::format_clock;
use crate::model::{option_letter, Explanation, Quiz, ResultsRecord};

/// Shown instead of an explanation when the question was skipped.
pub const NOT_ANSWERED_MESSAGE: &str = "You did not answer this question. The correct answer and explanation are provided above for your reference.";

/// Shown when nothing else yields content.
pub const NO_EXPLANATION_MESSAGE: &str = "Explanation not available for this question.";

/// Pick the explanation for the option the user chose.
///
/// Keyed explanations are looked up by letter (`"1"` → `"B"`), then by the
/// raw answer string, then by its numeric value. Misses fall back to the plain
/// text, then to [`NO_EXPLANATION_MESSAGE`]. Never fails.
pub fn resolve_explanation(explanation: &Explanation, user_answer: Option<&str>) -> String {
    let answer = match user_answer {
        Some(a) if !a.is_empty() => a,
        _ => return NOT_ANSWERED_MESSAGE.to_string(),
    };

    match explanation {
        Explanation::Keyed { entries, raw } => {
            let numeric = answer.trim().parse::<usize>().ok();
            let by_letter = numeric
                .filter(|n| *n < 26)
                .map(|n| option_letter(n).to_string());
            let hit = by_letter
                .and_then(|letter| entries.get(&letter))
                .or_else(|| entries.get(answer))
                .or_else(|| numeric.and_then(|n| entries.get(&n.to_string())));
            if let Some(text) = hit {
                return text.clone();
            }
            match raw {
                Some(raw) if !raw.trim().is_empty() => raw.clone(),
                _ => NO_EXPLANATION_MESSAGE.to_string(),
            }
        }
        Explanation::Text(text) if !text.trim().is_empty() => text.clone(),
        _ => NO_EXPLANATION_MESSAGE.to_string(),
    }
}

/// One reviewed question.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    /// 1-based position.
    pub number: usize,
    pub question_id: String,
    pub text: String,
    pub options: Vec<String>,
    /// `None` when unanswered.
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// A scored attempt ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub title: String,
    pub score: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub time_taken: String,
    pub questions: Vec<QuestionReview>,
}

impl ResultsView {
    pub fn build(quiz: &Quiz, results: &ResultsRecord) -> Self {
        let questions = quiz
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let outcome = results.per_question.get(&q.id);
                let user_answer = outcome.and_then(|o| o.user_answer.as_deref());
                QuestionReview {
                    number: i + 1,
                    question_id: q.id.clone(),
                    text: q.text.clone(),
                    options: q.options.clone(),
                    user_answer: user_answer.map(|a| q.option_label(a)),
                    correct_answer: q.option_label(&q.correct_option_index),
                    is_correct: outcome.is_some_and(|o| o.is_correct),
                    explanation: resolve_explanation(&q.explanation, user_answer),
                }
            })
            .collect();

        Self {
            title: quiz.title.clone(),
            score: results.score,
            correct_count: results.correct_count,
            total_questions: results.total_questions,
            time_taken: format_clock(results.time_taken_seconds),
            questions,
        }
    }

    /// Questions answered incorrectly or skipped.
    pub fn missed(&self) -> impl Iterator<Item = &QuestionReview> {
        self.questions.iter().filter(|q| !q.is_correct)
    }
}
