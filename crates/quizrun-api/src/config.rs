//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizrun_core::loader::LoaderConfig;
use quizrun_core::store::AutosavePolicy;

/// Remote backend settings.
///
/// Note: Custom Debug impl masks the token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8000/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Path of the attempt-history endpoint.
    #[serde(default = "default_history_path")]
    pub history_path: String,
    /// How long fetched questions stay cached, in seconds. 0 disables caching.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("history_path", &self.history_path)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout(),
            history_path: default_history_path(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Questions per progressive batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Time limit for fetched quizzes, in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    #[serde(default = "default_heartbeat")]
    pub heartbeat_secs: u64,
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            time_limit_secs: default_time_limit(),
            heartbeat_secs: default_heartbeat(),
            debounce_ms: default_debounce(),
        }
    }
}

impl SessionConfig {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            batch_size: self.batch_size,
            time_limit_secs: self.time_limit_secs,
        }
    }

    pub fn autosave_policy(&self) -> AutosavePolicy {
        AutosavePolicy {
            heartbeat: Duration::from_secs(self.heartbeat_secs.max(1)),
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

/// Top-level quizrun configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizrunConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Where in-progress attempts are kept.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_history_path() -> String {
    "/quiz/history/".to_string()
}
fn default_cache_ttl() -> u64 {
    15 * 60
}
fn default_batch_size() -> usize {
    5
}
fn default_time_limit() -> u32 {
    1200
}
fn default_heartbeat() -> u64 {
    10
}
fn default_debounce() -> u64 {
    1500
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from("./.quizrun")
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizrun.toml` in the current directory
/// 2. `~/.config/quizrun/config.toml`
///
/// Environment variable overrides: `QUIZRUN_API_URL`, `QUIZRUN_API_TOKEN`.
pub fn load_config() -> Result<QuizrunConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizrunConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizrun.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizrunConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizrunConfig::default(),
    };

    if let Ok(url) = std::env::var("QUIZRUN_API_URL") {
        config.api.base_url = url;
    }
    if let Ok(token) = std::env::var("QUIZRUN_API_TOKEN") {
        config.api.token = Some(token);
    }

    config.api.base_url = resolve_env_vars(&config.api.base_url);
    config.api.token = config
        .api
        .token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.is_empty());

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizrun"))
}
