//! Application configuration file `pinnote.toml`.
//!
//! ```toml
//! [logging]
//! level = "info"              # trace|debug|info|warn|error
//! dir = "/var/log/pinnote"    # absolute; omit to skip file logging
//!
//! [store]
//! collection = "notes"
//! database_path = "/var/lib/pinnote/notes.sqlite3"   # omit for in-memory
//! ```
//!
//! Every field has a default, so a missing or empty file equals
//! [`AppConfig::default`].

use crate::logging::default_log_level;
use crate::store::{SqliteDocumentStore, StoreResult, DEFAULT_COLLECTION};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Directory for rolling log files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            database_path: None,
        }
    }
}

fn default_level() -> String {
    default_log_level().to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Serialize(err) => write!(f, "cannot write config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl AppConfig {
    /// The well-known config file name.
    pub fn filename() -> &'static str {
        "pinnote.toml"
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Reads and parses a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Opens the configured SQLite document store.
    ///
    /// Without `database_path` the store lives in memory.
    pub fn open_store(&self) -> StoreResult<SqliteDocumentStore> {
        match &self.store.database_path {
            Some(path) => SqliteDocumentStore::open(path, self.store.collection.as_str()),
            None => SqliteDocumentStore::open_in_memory(self.store.collection.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use crate::logging::default_log_level;
    use std::path::PathBuf;

    #[test]
    fn empty_file_is_default_config() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.store.collection, "notes");
        assert_eq!(config.logging.level, default_log_level());
        assert!(config.store.database_path.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            "[store]\ndatabase_path = \"/tmp/notes.sqlite3\"\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();
        assert_eq!(
            config.store.database_path,
            Some(PathBuf::from("/tmp/notes.sqlite3"))
        );
        assert_eq!(config.store.collection, "notes");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let mut config = AppConfig::default();
        config.store.collection = "archive".to_string();
        let text = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(AppConfig::from_toml("[store\ncollection = 1").is_err());
    }
}
