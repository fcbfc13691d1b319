//! Runtime configuration resolved from the environment.
//!
//! | variable              | default                                  |
//! |-----------------------|------------------------------------------|
//! | `COMPLAINT_DB_PATH`   | `<temp dir>/complaint_store.sqlite3`     |
//! | `COMPLAINT_LOG_LEVEL` | `default_log_level()`                    |
//! | `COMPLAINT_LOG_DIR`   | unset: no file logging                   |
//!
//! Blank values count as unset. `from_env` first loads a `.env` file from
//! the working directory when one exists; variables already set in the
//! process win over the file.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "COMPLAINT_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "COMPLAINT_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "COMPLAINT_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "complaint_store.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
