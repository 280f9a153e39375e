//! quizrun-api — Remote collaborators for the quiz engine.
//!
//! Implements the `QuizSource` and `AttemptSink` ports over HTTP, plus the
//! client configuration and an in-process mock backend.

pub mod cache;
pub mod client;
pub mod config;
pub mod mock;

pub use client::HttpBackend;
pub use config::{load_config, load_config_from, ApiConfig, QuizrunConfig, SessionConfig};
pub use mock::MockBackend;
