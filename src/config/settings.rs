//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub athletes: AthleteConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    /// `pretty` or `json`
    pub format: String,
}

/// Athlete account policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AthleteConfig {
    pub min_password_length: usize,
}

impl Settings {
    /// Load settings from the optional `config` file and `BALEKA__` environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(config::File::with_name("config").required(false))
    }

    /// Load settings from a specific file, still honouring environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        Self::load(config::File::from(path.as_ref()))
    }

    fn load<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(config::Environment::with_prefix("BALEKA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::BalekaError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/baleka".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                idle_timeout_seconds: 600,
                max_lifetime_seconds: 1800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/baleka".to_string(),
                format: "pretty".to_string(),
            },
            athletes: AthleteConfig {
                min_password_length: 8,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[database]\nurl = \"postgresql://db/test\"\nmax_connections = 4\nidle_timeout_seconds = 120\n\n[logging]\nformat = \"json\"\n\n[athletes]\nmin_password_length = 12"
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.database.url, "postgresql://db/test");
        assert_eq!(settings.database.max_connections, 4);
        assert_eq!(settings.database.min_connections, 1);
        assert_eq!(settings.athletes.min_password_length, 12);
        assert_eq!(settings.database.idle_timeout_seconds, 120);
        assert_eq!(settings.database.max_lifetime_seconds, 1800);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "json");
    }
}
