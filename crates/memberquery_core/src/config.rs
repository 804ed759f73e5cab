//! Runtime configuration for opening the store and logging.
//!
//! # Responsibility
//! - Parse TOML configuration into a typed `CoreConfig`.
//! - Select the run profile (`local` seeds sample data, `test` does not).
//!
//! # Invariants
//! - Every field has a default; an empty document is a valid config.
//! - A missing `db_path` means an in-memory store.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_SEED_COUNT: u32 = 100;

/// Run profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Seeds the sample roster into an empty store on open.
    Local,
    /// Opens the store as-is.
    #[default]
    Test,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Store, profile and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub profile: Profile,
    /// SQLite file; `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; no file logging when unset.
    pub log_dir: Option<PathBuf>,
    /// Members created by the `local` profile seed.
    pub seed_count: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            db_path: None,
            log_level: None,
            log_dir: None,
            seed_count: DEFAULT_SEED_COUNT,
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, Profile};
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.profile, Profile::Test);
        assert_eq!(config.seed_count, 100);
    }

    #[test]
    fn parses_all_fields() {
        let config = CoreConfig::from_toml_str(
            r#"
profile = "local"
db_path = "/tmp/members.sqlite3"
log_level = "warn"
log_dir = "/tmp/logs"
seed_count = 10
"#,
        )
        .unwrap();

        assert_eq!(config.profile, Profile::Local);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/members.sqlite3")));
        assert_eq!(config.effective_log_level(), "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.seed_count, 10);
    }

    #[test]
    fn rejects_unknown_profile_and_fields() {
        assert!(matches!(
            CoreConfig::from_toml_str("profile = \"prod\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("dbpath = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CoreConfig::load("/nonexistent/memberquery.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("memberquery.toml"));
    }
}
