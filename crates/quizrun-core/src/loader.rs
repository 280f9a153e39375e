//! Quiz loader.
//!
//! Fetches raw question records, normalizes heterogeneous field names into the
//! canonical [`Question`] shape, and can deliver the quiz in ordered batches.

use std::sync::Arc;

use futures::stream::{self, Stream};
use serde_json::Value;

use crate::error::LoadError;
use crate::model::{Explanation, Question, Quiz};
use crate::traits::QuizSource;

/// Question sets above this size yield to the runtime between batches.
const YIELD_THRESHOLD: usize = 20;

/// Loader settings.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Questions per progressive batch.
    pub batch_size: usize,
    /// Time limit applied to loaded quizzes.
    pub time_limit_secs: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            time_limit_secs: 1200,
        }
    }
}

/// Loads quizzes from a [`QuizSource`].
pub struct QuizLoader {
    source: Arc<dyn QuizSource>,
    config: LoaderConfig,
}

impl QuizLoader {
    pub fn new(source: Arc<dyn QuizSource>, config: LoaderConfig) -> Self {
        Self { source, config }
    }

    /// Load the complete quiz.
    pub async fn load(&self, source_id: &str) -> Result<Quiz, LoadError> {
        let questions = self.fetch_normalized(source_id).await?;
        Ok(self.assemble(source_id, questions, false))
    }

    /// Load the quiz for progressive delivery.
    ///
    /// Fails up front for fetch errors and empty sets; afterwards the batches
    /// are infallible.
    pub async fn load_progressive(&self, source_id: &str) -> Result<ProgressiveLoad, LoadError> {
        let questions = self.fetch_normalized(source_id).await?;
        Ok(ProgressiveLoad {
            template: self.assemble(source_id, Vec::new(), true),
            questions,
            batch_size: self.config.batch_size.max(1),
        })
    }

    async fn fetch_normalized(&self, source_id: &str) -> Result<Vec<Question>, LoadError> {
        let raw = self.source.fetch_questions(source_id).await.map_err(|e| {
            tracing::error!("failed to load questions for {source_id}: {e:#}");
            LoadError::classify(&e)
        })?;

        let total = raw.len();
        let questions: Vec<Question> = raw.iter().filter_map(normalize_question).collect();
        if questions.len() < total {
            tracing::warn!(
                "dropped {} malformed question(s) for {source_id}",
                total - questions.len()
            );
        }
        if questions.is_empty() {
            return Err(LoadError::NoQuestions);
        }

        tracing::info!("loaded {} questions for {source_id}", questions.len());
        Ok(questions)
    }

    fn assemble(&self, source_id: &str, questions: Vec<Question>, partially_loaded: bool) -> Quiz {
        Quiz {
            id: source_id.to_string(),
            source_id: source_id.to_string(),
            title: format!("Quiz for Document #{source_id}"),
            questions,
            time_limit_secs: self.config.time_limit_secs,
            partially_loaded,
        }
    }
}

/// A fetched quiz waiting to be delivered in ordered batches.
#[derive(Debug, Clone)]
pub struct ProgressiveLoad {
    template: Quiz,
    questions: Vec<Question>,
    batch_size: usize,
}

impl ProgressiveLoad {
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// The complete quiz, skipping incremental delivery.
    pub fn into_complete(self) -> Quiz {
        Quiz {
            questions: self.questions,
            partially_loaded: false,
            ..self.template
        }
    }

    /// Stream growing snapshots of the quiz, one per batch.
    ///
    /// Every snapshot but the last has `partially_loaded == true`; the last
    /// one holds all questions in their original order.
    pub fn into_stream(self) -> impl Stream<Item = Quiz> {
        let total = self.questions.len();
        let yield_between = total > YIELD_THRESHOLD;
        let state = (self, 0usize);

        stream::unfold(state, move |(load, delivered)| async move {
            if delivered >= total {
                return None;
            }
            if yield_between && delivered > 0 {
                tokio::task::yield_now().await;
            }
            let end = (delivered + load.batch_size).min(total);
            let snapshot = Quiz {
                questions: load.questions[..end].to_vec(),
                partially_loaded: end < total,
                ..load.template.clone()
            };
            tracing::debug!("delivered questions {}..{end} of {total}", delivered + 1);
            Some((snapshot, (load, end)))
        })
    }
}

/// Normalize one raw record. Returns `None` for records that cannot be used.
pub fn normalize_question(raw: &Value) -> Option<Question> {
    let Some(obj) = raw.as_object() else {
        tracing::warn!("skipping non-object question record");
        return None;
    };

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => number_to_string(n),
        _ => uuid::Uuid::new_v4().simple().to_string(),
    };

    let Some(text) = first_string(obj, &["question", "text", "question_text"]) else {
        tracing::warn!("skipping question {id}: no text");
        return None;
    };

    let options: Vec<String> = obj
        .get("options")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_to_string).collect())
        .unwrap_or_default();
    if options.len() < 2 {
        tracing::warn!("skipping question {id}: {} option(s)", options.len());
        return None;
    }

    let Some(correct_option_index) = ["correct_option_index", "correct_answer", "answer"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(scalar_to_string))
    else {
        tracing::warn!("skipping question {id}: no canonical answer");
        return None;
    };

    let hint = first_string(obj, &["hint", "hint_text"]);

    let explanation = ["explanation", "explanation_text"]
        .iter()
        .map(|k| obj.get(*k).map(Explanation::from_value).unwrap_or_default())
        .find(|e| *e != Explanation::None)
        .unwrap_or_default();

    Some(Question {
        id,
        text,
        options,
        correct_option_index,
        hint,
        explanation,
    })
}

fn first_string(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integral floats render without a fraction, so `1.0` matches option `"1"`.
fn number_to_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
