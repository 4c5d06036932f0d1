//! Application configuration
//!
//! Read from a TOML file:
//!
//! ```toml
//! [database]
//! path = "rowmap.db"
//!
//! [logging]
//! profile = "development"
//!
//! [engine]
//! comparison_mapping = "legacy"
//! ```
//!
//! A missing file yields the defaults. A file that exists must parse and
//! must name a database path.

use rowmap_core::logging_facility::Profile;
use rowmap_core::EngineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "rowmap.toml";
pub const DEFAULT_DATABASE: &str = "rowmap.db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error while reading config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Error: missing data in config file ({0})")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load the configuration at `path`, or the defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Missing("database.path"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowmap_core::ComparisonMapping;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/rowmap.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.path, PathBuf::from(DEFAULT_DATABASE));
    }

    #[test]
    fn test_full_file() {
        let config = AppConfig::parse(
            r#"
            [database]
            path = "/var/lib/rowmap/blog.db"

            [logging]
            profile = "production"

            [engine]
            comparison_mapping = "corrected"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/var/lib/rowmap/blog.db"));
        assert_eq!(config.logging.profile, Profile::Production);
        assert_eq!(config.engine.comparison_mapping, ComparisonMapping::Corrected);
    }

    #[test]
    fn test_empty_database_path_is_rejected() {
        let err = AppConfig::parse("[database]\npath = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("database.path")));
    }

    #[test]
    fn test_unknown_profile_is_a_parse_error() {
        let err = AppConfig::parse("[logging]\nprofile = \"verbose\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
