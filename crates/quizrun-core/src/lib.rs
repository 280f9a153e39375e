//! quizrun-core — Timed quiz session engine.
//!
//! This crate defines the quiz data model, the session state machine, scoring,
//! local progress persistence and the collaborator ports that the rest of the
//! quizrun system builds on.

pub mod clock;
pub mod driver;
pub mod error;
pub mod loader;
pub mod model;
pub mod presenter;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod store;
pub mod submission;
pub mod traits;
