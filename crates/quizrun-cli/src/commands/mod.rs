pub mod demo;
pub mod history;
pub mod interactive;
pub mod progress;
pub mod take;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use quizrun_api::config::{load_config_from, QuizrunConfig};
use quizrun_core::storage::FileStore;
use quizrun_core::store::SessionStore;

/// Configuration plus the resolved storage directory.
pub struct Settings {
    pub config: QuizrunConfig,
    pub storage_dir: PathBuf,
}

impl Settings {
    pub fn load(config_path: Option<&Path>, storage_dir: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let storage_dir = storage_dir.unwrap_or_else(|| config.storage_dir.clone());
        Ok(Self {
            config,
            storage_dir,
        })
    }

    pub fn open_store(&self) -> Result<SessionStore> {
        let backend = FileStore::open(&self.storage_dir).with_context(|| {
            format!("failed to open progress storage: {}", self.storage_dir.display())
        })?;
        Ok(SessionStore::new(Arc::new(backend)))
    }
}
