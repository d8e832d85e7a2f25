//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database and log locations plus the log level.
//! - Keep environment lookups in one place so front ends only override.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Defaults live under the platform data directory (`dirs`), falling back
//!   to the system temp directory.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "SYMTRACK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "SYMTRACK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "SYMTRACK_LOG_DIR";

const APP_DIR_NAME: &str = "symtrack";
const DB_FILE_NAME: &str = "symtrack.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "failed to create directory `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
        }
    }
}

/// Core runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: data_dir.join(LOG_DIR_NAME),
        }
    }
}

impl CoreConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(LOG_DIR_ENV) {
            config.log_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Creates the database file's parent directory when missing.
    pub fn ensure_db_parent(&self) -> Result<(), ConfigError> {
        match self.db_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => create_dir(parent),
            _ => Ok(()),
        }
    }
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_overrides_defaults_and_ignores_blank_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (DB_PATH_ENV, "/tmp/symtrack-test/db.sqlite3"),
            (LOG_LEVEL_ENV, "  "),
            (LOG_DIR_ENV, "/tmp/symtrack-test/logs"),
        ]);
        let config = CoreConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/symtrack-test/db.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, PathBuf::from("/tmp/symtrack-test/logs"));
    }

    #[test]
    fn defaults_share_one_app_directory() {
        let config = CoreConfig::from_lookup(|_| None);
        assert_eq!(config.db_path.parent(), config.log_dir.parent());
        assert!(config.db_path.ends_with(DB_FILE_NAME));
    }

    #[test]
    fn ensure_db_parent_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::default().with_db_path(dir.path().join("nested/deeper/db.sqlite3"));
        config.ensure_db_parent().unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
    }
}
