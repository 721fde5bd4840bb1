//! Configuration validation module
//!
//! This module provides validation functions for configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{BalekaError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_athlete_config(&settings.athletes)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(BalekaError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(BalekaError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(BalekaError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(BalekaError::Config(
            "Acquire timeout must be greater than 0".to_string()
        ));
    }

    if config.idle_timeout_seconds == 0 || config.max_lifetime_seconds == 0 {
        return Err(BalekaError::Config(
            "Idle timeout and max lifetime must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(BalekaError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(BalekaError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.file_path.is_empty() {
        return Err(BalekaError::Config(
            "Log file path is required".to_string()
        ));
    }

    let valid_formats = ["pretty", "json"];
    if !valid_formats.contains(&config.format.as_str()) {
        return Err(BalekaError::Config(
            format!("Invalid log format: {}. Valid formats: {:?}", config.format, valid_formats)
        ));
    }

    Ok(())
}

/// Validate athlete account policy
fn validate_athlete_config(config: &super::AthleteConfig) -> Result<()> {
    if config.min_password_length < 6 {
        return Err(BalekaError::Config(
            "Minimum password length must be at least 6".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_pool_bounds_checked() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert!(matches!(validate_settings(&settings), Err(BalekaError::Config(_))));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_pool_timeouts_must_be_positive() {
        let mut settings = Settings::default();
        settings.database.max_lifetime_seconds = 0;
        assert!(matches!(validate_settings(&settings), Err(BalekaError::Config(_))));

        let mut settings = Settings::default();
        settings.database.idle_timeout_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_log_format_checked() {
        let mut settings = Settings::default();
        settings.logging.format = "json".to_string();
        assert!(validate_settings(&settings).is_ok());

        settings.logging.format = "xml".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_weak_password_policy_rejected() {
        let mut settings = Settings::default();
        settings.athletes.min_password_length = 3;
        assert!(validate_settings(&settings).is_err());
    }
}
