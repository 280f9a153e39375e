//! Core data model types for quizrun.
//!
//! A [`Quiz`] is immutable once loaded, a [`SessionState`] is the in-progress
//! attempt, and a [`ResultsRecord`] is the scored outcome.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback shown when a question has no hint.
pub const DEFAULT_HINT: &str = "No hint available for this question. Try thinking about related concepts covered in your materials.";

/// A loaded quiz definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Identity used to key persisted progress.
    pub id: String,
    /// The document/source the questions were generated from.
    pub source_id: String,
    /// Human-readable title.
    pub title: String,
    /// Questions in presentation order.
    pub questions: Vec<Question>,
    /// Time allowed for the whole attempt.
    pub time_limit_secs: u32,
    /// True while the loader is still delivering batches.
    #[serde(default)]
    pub partially_loaded: bool,
}

impl Quiz {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.id.as_str())
    }
}

/// A single multiple-choice question in canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// At least two options.
    pub options: Vec<String>,
    /// Canonical answer. Compared as a string: feeds emit both numeric indices and letters.
    pub correct_option_index: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub explanation: Explanation,
}

impl Question {
    pub fn hint_or_default(&self) -> &str {
        self.hint.as_deref().unwrap_or(DEFAULT_HINT)
    }

    /// Render an answer string as `"B. Swift"` when it is a valid option index,
    /// otherwise return it as-is.
    pub fn option_label(&self, answer: &str) -> String {
        match answer.parse::<usize>() {
            Ok(index) if index < self.options.len() => {
                format!("{}. {}", option_letter(index), self.options[index])
            }
            _ => answer.to_string(),
        }
    }
}

/// Letter for an option index (`0 -> 'A'`). Indices beyond `Z` map to `'?'`.
pub fn option_letter(index: usize) -> char {
    if index < 26 {
        (b'A' + index as u8) as char
    } else {
        '?'
    }
}

/// A question's explanation, resolved once at load time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Explanation {
    #[default]
    None,
    /// A single explanation shown regardless of the chosen option.
    Text(String),
    /// Per-option explanations keyed by letter (`"A"`) or index (`"0"`).
    Keyed {
        entries: BTreeMap<String, String>,
        /// The original string when the mapping arrived JSON-encoded.
        raw: Option<String>,
    },
}

impl Explanation {
    /// Build from a raw payload value.
    ///
    /// Accepts a JSON object, a string containing a JSON object, or a plain
    /// string. Anything unparseable degrades to [`Explanation::Text`].
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Explanation::None,
            serde_json::Value::String(s) => Self::from_text(s),
            serde_json::Value::Object(map) => Explanation::Keyed {
                entries: keyed_entries(map),
                raw: None,
            },
            other => Explanation::Text(other.to_string()),
        }
    }

    fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            return Explanation::None;
        }
        match serde_json::from_str::<serde_json::Value>(s) {
            Ok(serde_json::Value::Object(map)) => Explanation::Keyed {
                entries: keyed_entries(&map),
                raw: Some(s.to_string()),
            },
            _ => Explanation::Text(s.to_string()),
        }
    }
}

fn keyed_entries(map: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(k, v)| {
            let text = match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null | serde_json::Value::Bool(false) => return None,
                other => other.to_string(),
            };
            (!text.is_empty()).then(|| (k.clone(), text))
        })
        .collect()
}

/// In-memory state of an attempt in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub quiz_id: String,
    /// Question id to chosen option index (as a string).
    pub selected_answers: BTreeMap<String, String>,
    pub current_question_index: usize,
    pub time_left_seconds: u32,
    pub submitted: bool,
    /// When each question was first shown. Session-local.
    #[serde(default)]
    pub per_question_started_at: BTreeMap<String, DateTime<Utc>>,
    /// Seconds from first display to first answer. Session-local.
    #[serde(default)]
    pub per_question_elapsed_seconds: BTreeMap<String, u32>,
}

impl SessionState {
    pub fn fresh(quiz: &Quiz) -> Self {
        Self {
            quiz_id: quiz.id.clone(),
            selected_answers: BTreeMap::new(),
            current_question_index: 0,
            time_left_seconds: quiz.time_limit_secs,
            submitted: false,
            per_question_started_at: BTreeMap::new(),
            per_question_elapsed_seconds: BTreeMap::new(),
        }
    }

    pub fn answered_count(&self) -> usize {
        self.selected_answers.len()
    }

    /// The durable subset written to local storage.
    pub fn progress(&self) -> PersistedProgress {
        PersistedProgress {
            selected_answers: self.selected_answers.clone(),
            current_question_index: self.current_question_index,
            time_left: self.time_left_seconds,
            quiz_submitted: self.submitted,
        }
    }
}

/// The minimal persisted record, one per quiz id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProgress {
    #[serde(default)]
    pub selected_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub current_question_index: usize,
    #[serde(default)]
    pub time_left: u32,
    #[serde(default)]
    pub quiz_submitted: bool,
}

/// Outcome for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// The scored attempt. Created once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsRecord {
    /// Percentage, 0-100.
    pub score: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub per_question: BTreeMap<String, QuestionOutcome>,
    pub time_taken_seconds: u32,
}

/// A built-in five-question quiz that needs no backend.
pub fn demo_quiz() -> Quiz {
    let q = |id: &str, text: &str, options: [&str; 4], answer: &str, hint: &str, explanation: &str| {
        Question {
            id: id.into(),
            text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option_index: answer.into(),
            hint: Some(hint.into()),
            explanation: Explanation::Text(explanation.into()),
        }
    };

    Quiz {
        id: "demo-quiz".into(),
        source_id: "demo".into(),
        title: "Demo Quiz: Technology & Innovation".into(),
        time_limit_secs: 300,
        partially_loaded: false,
        questions: vec![
            q(
                "q1",
                "Which company introduced the concept of \"ChatGPT\" that revolutionized conversational AI?",
                ["Google", "OpenAI", "Microsoft", "Meta"],
                "1",
                "This company was founded by Sam Altman and Elon Musk (initially).",
                "OpenAI developed ChatGPT, which became one of the most influential AI chatbots, demonstrating advanced natural language processing capabilities.",
            ),
            q(
                "q2",
                "What does \"API\" stand for in software development?",
                [
                    "Application Programming Interface",
                    "Automated Programming Integration",
                    "Advanced Protocol Implementation",
                    "Application Process Integration",
                ],
                "0",
                "It's how different software applications communicate with each other.",
                "API stands for Application Programming Interface, which defines how software components should interact and communicate with each other.",
            ),
            q(
                "q3",
                "Which programming language is primarily used for iOS app development?",
                ["Java", "Swift", "Python", "JavaScript"],
                "1",
                "This language was introduced by Apple in 2014 to replace Objective-C.",
                "Swift is Apple's modern programming language designed specifically for iOS, macOS, watchOS, and tvOS development.",
            ),
            q(
                "q4",
                "What does \"SaaS\" stand for in cloud computing?",
                [
                    "Software as a Service",
                    "System as a Service",
                    "Security as a Service",
                    "Storage as a Service",
                ],
                "0",
                "Think of applications like Gmail, Dropbox, or Slack that you access through a web browser.",
                "SaaS (Software as a Service) is a cloud computing model where software applications are provided over the internet on a subscription basis.",
            ),
            q(
                "q5",
                "Which technology is primarily used to create cryptocurrencies like Bitcoin?",
                [
                    "Artificial Intelligence",
                    "Blockchain",
                    "Quantum Computing",
                    "Cloud Computing",
                ],
                "1",
                "This technology creates a distributed ledger that's virtually tamper-proof.",
                "Blockchain is a distributed ledger technology that maintains a continuously growing list of records, called blocks, which are secured using cryptography.",
            ),
        ],
    }
}
