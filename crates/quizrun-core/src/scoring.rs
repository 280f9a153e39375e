//! Authoritative local scoring.
//!
//! Pure functions: the same quiz and answers always produce the same record.

use std::collections::BTreeMap;

use crate::model::{QuestionOutcome, Quiz, ResultsRecord};

/// Score an attempt.
///
/// A question is correct only when an answer exists and equals the canonical
/// answer as a string. `score` is `round(100 * correct / total)`, or 0 for an
/// empty quiz.
pub fn score_attempt(
    quiz: &Quiz,
    selected_answers: &BTreeMap<String, String>,
    time_left_secs: u32,
) -> ResultsRecord {
    let mut per_question = BTreeMap::new();
    let mut correct_count = 0usize;

    for question in &quiz.questions {
        let user_answer = selected_answers.get(&question.id).cloned();
        let is_correct = user_answer.as_deref() == Some(question.correct_option_index.as_str());
        if is_correct {
            correct_count += 1;
        }
        tracing::trace!(
            question = %question.id,
            answer = ?user_answer,
            correct = %question.correct_option_index,
            is_correct
        );
        per_question.insert(
            question.id.clone(),
            QuestionOutcome {
                user_answer,
                correct_answer: question.correct_option_index.clone(),
                is_correct,
            },
        );
    }

    let total_questions = quiz.questions.len();
    let score = percentage(correct_count, total_questions);
    tracing::debug!("scored {correct_count}/{total_questions} correct: {score}%");

    ResultsRecord {
        score,
        correct_count,
        total_questions,
        per_question,
        time_taken_seconds: quiz.time_limit_secs.saturating_sub(time_left_secs),
    }
}

/// `round(100 * correct / total)` with halves rounded up; 0 when `total == 0`.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)) as u32
}

/// Clamp a reported duration into `[0, limit]`.
pub fn clamp_time_spent(taken: u32, limit: u32) -> u32 {
    taken.min(limit)
}

/// Score as a fraction in `[0, 1]`, the unit the history endpoint expects.
pub fn score_fraction(score: u32) -> f64 {
    (f64::from(score) / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::demo_quiz;

    fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(q, a)| (q.to_string(), a.to_string()))
            .collect()
    }

    #[test]
    fn three_of_five_with_forty_seconds_left() {
        let quiz = demo_quiz();
        // q1, q2, q4 correct; q3, q5 wrong.
        let selected = answers(&[("q1", "1"), ("q2", "0"), ("q3", "2"), ("q4", "0"), ("q5", "3")]);
        let results = score_attempt(&quiz, &selected, 40);

        assert_eq!(results.score, 60);
        assert_eq!(results.correct_count, 3);
        assert_eq!(results.total_questions, 5);
        assert_eq!(results.time_taken_seconds, 260);
        assert!(!results.per_question["q3"].is_correct);
        assert_eq!(results.per_question["q3"].correct_answer, "1");
    }

    #[test]
    fn unanswered_questions_are_incorrect() {
        let quiz = demo_quiz();
        let results = score_attempt(&quiz, &answers(&[("q1", "1")]), 300);
        assert_eq!(results.correct_count, 1);
        assert_eq!(results.score, 20);
        assert_eq!(results.per_question["q5"].user_answer, None);
        assert!(!results.per_question["q5"].is_correct);
        assert_eq!(results.time_taken_seconds, 0);
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let mut quiz = demo_quiz();
        quiz.questions.clear();
        let results = score_attempt(&quiz, &BTreeMap::new(), 10);
        assert_eq!(results.score, 0);
        assert_eq!(results.total_questions, 0);
        assert!(results.per_question.is_empty());
    }

    #[test]
    fn comparison_is_string_equality() {
        let mut quiz = demo_quiz();
        quiz.questions[0].correct_option_index = "B".into();
        // "1" and "B" denote the same option in different feeds but are not equal.
        let results = score_attempt(&quiz, &answers(&[("q1", "1")]), 0);
        assert!(!results.per_question["q1"].is_correct);
        let results = score_attempt(&quiz, &answers(&[("q1", "B")]), 0);
        assert!(results.per_question["q1"].is_correct);
    }

    #[test]
    fn percentage_rounds_half_up() {
        for total in 1..=40usize {
            for correct in 0..=total {
                let expected = (100.0 * correct as f64 / total as f64).round() as u32;
                assert_eq!(percentage(correct, total), expected, "{correct}/{total}");
            }
        }
        assert_eq!(percentage(1, 8), 13); // 12.5 -> 13
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn time_never_goes_negative_or_beyond_limit() {
        let quiz = demo_quiz();
        let results = score_attempt(&quiz, &BTreeMap::new(), 900);
        assert_eq!(results.time_taken_seconds, 0);
        assert_eq!(clamp_time_spent(5000, 1200), 1200);
        assert_eq!(score_fraction(60), 0.6);
        assert_eq!(score_fraction(100), 1.0);
    }
}
