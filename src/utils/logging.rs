//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the data-access layer.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::database::session::EntityKind;
use crate::utils::errors::{BalekaError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "baleka.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json = config.format == "json";

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer().with_writer(std::io::stdout)
        }))
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking.clone())
        }))
        .with(json.then(|| {
            tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout)
        }))
        .with(json.then(|| {
            tracing_subscriber::fmt::layer().json().with_writer(non_blocking)
        }))
        .try_init()
        .map_err(|e| BalekaError::Config(format!("Logging already initialized: {}", e)))?;

    info!(format = %config.format, "Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log club lifecycle events
pub fn log_club_event(club_id: i64, event: &str, user_id: Option<&str>) {
    info!(
        club_id = club_id,
        event = event,
        user_id = user_id,
        "Club event occurred"
    );
}

/// Log membership transitions
pub fn log_membership_change(club_id: i64, athlete_id: i64, status: &str) {
    info!(
        club_id = club_id,
        athlete_id = athlete_id,
        status = status,
        "Club membership changed"
    );
}

/// Log run actions
pub fn log_run_action(run_id: i64, action: &str, athlete_id: i64) {
    info!(
        run_id = run_id,
        action = action,
        athlete_id = athlete_id,
        "Run action performed"
    );
}

/// Log athlete account actions
pub fn log_athlete_action(athlete_id: i64, action: &str) {
    info!(athlete_id = athlete_id, action = action, "Athlete action performed");
}

/// Log the outcome of a concurrency conflict
pub fn log_conflict_resolution(entity: EntityKind, conflicts: usize, resolved: bool) {
    if resolved {
        warn!(
            entity = %entity,
            conflicts = conflicts,
            "Concurrency conflict resolved, last writer wins"
        );
    } else {
        error!(
            entity = %entity,
            conflicts = conflicts,
            "Concurrency conflict cannot be resolved"
        );
    }
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_helpers_without_subscriber() {
        log_club_event(1, "created", Some("u1"));
        log_membership_change(1, 2, "joined");
        log_run_action(3, "added", 2);
        log_conflict_resolution(EntityKind::Club, 1, true);
        log_database_operation("select", "runs", 3, true);
    }

    #[test]
    fn test_json_logging_initializes_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            file_path: dir.path().to_string_lossy().into_owned(),
            format: "json".to_string(),
        };

        let guard = init_logging(&config).unwrap();
        log_run_action(3, "added", 2);
        assert!(matches!(init_logging(&config), Err(BalekaError::Config(_))));
        drop(guard);
    }
}
