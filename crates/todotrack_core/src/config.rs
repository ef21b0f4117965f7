//! Client configuration resolved from the environment.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `log_dir` is always absolute.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TODOTRACK_DB_PATH";
pub const LOG_DIR_ENV: &str = "TODOTRACK_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "TODOTRACK_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "todotrack.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "todotrack-logs";

/// Runtime settings for a client process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let temp_dir = std::env::temp_dir();
        Self {
            db_path: temp_dir.join(DEFAULT_DB_FILE_NAME),
            log_dir: temp_dir.join(DEFAULT_LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TODOTRACK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values returned from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = non_blank(lookup(DB_PATH_ENV)) {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(lookup(LOG_DIR_ENV)) {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                config.log_dir = path;
            }
        }
        if let Some(value) = non_blank(lookup(LOG_LEVEL_ENV)) {
            config.log_level = value;
        }
        config
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
