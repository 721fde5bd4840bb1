//! Error handling for Baleka
//!
//! This module defines the main error types used throughout the data-access layer
//! and provides a unified error handling strategy.

use thiserror::Error;

use crate::database::session::EntityKind;

/// Main error type for the Baleka data-access layer
#[derive(Error, Debug)]
pub enum BalekaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Athlete not found: {athlete_id}")]
    AthleteNotFound { athlete_id: i64 },

    #[error("Club not found: {club_id}")]
    ClubNotFound { club_id: i64 },

    #[error("Club member not found: {member_id}")]
    MemberNotFound { member_id: i64 },

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: i64 },

    #[error("Ambiguous match: {count} {entity} rows matched {criteria}")]
    AmbiguousMatch {
        entity: EntityKind,
        criteria: String,
        count: usize,
    },

    #[error("Concurrency conflict on {entity} {key}")]
    ConcurrencyConflict { entity: EntityKind, key: i64 },

    #[error("Membership of athlete {athlete_id} in club {club_id} not found")]
    MembershipNotFound { club_id: i64, athlete_id: i64 },

    #[error("Concurrency conflicts for {0} cannot be resolved")]
    UnsupportedConflict(EntityKind),

    #[error("Commit rejected by the store without conflict details")]
    CommitRejected,

    #[error("Commit still conflicting after retry: {0} entries")]
    ConflictRetryExhausted(usize),

    #[error("Invalid date '{input}': {source}")]
    DateParse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Baleka operations
pub type Result<T> = std::result::Result<T, BalekaError>;

impl BalekaError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            BalekaError::Database(_) => false,
            BalekaError::Migration(_) => false,
            BalekaError::Config(_) => false,
            BalekaError::ConfigLoad(_) => false,
            BalekaError::AthleteNotFound { .. } => false,
            BalekaError::ClubNotFound { .. } => false,
            BalekaError::MemberNotFound { .. } => false,
            BalekaError::RunNotFound { .. } => false,
            BalekaError::AmbiguousMatch { .. } => false,
            BalekaError::ConcurrencyConflict { .. } => true,
            BalekaError::MembershipNotFound { .. } => false,
            BalekaError::UnsupportedConflict(_) => false,
            BalekaError::CommitRejected => true,
            BalekaError::ConflictRetryExhausted(_) => true,
            BalekaError::DateParse { .. } => false,
            BalekaError::Validation(_) => false,
            BalekaError::InvalidCredentials => true,
            BalekaError::PasswordHash(_) => false,
            BalekaError::Serialization(_) => false,
            BalekaError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BalekaError::Database(_) => ErrorSeverity::Critical,
            BalekaError::Migration(_) => ErrorSeverity::Critical,
            BalekaError::Config(_) => ErrorSeverity::Critical,
            BalekaError::ConfigLoad(_) => ErrorSeverity::Critical,
            BalekaError::UnsupportedConflict(_) => ErrorSeverity::Critical,
            BalekaError::AmbiguousMatch { .. } => ErrorSeverity::Critical,
            BalekaError::InvalidCredentials => ErrorSeverity::Warning,
            BalekaError::ConflictRetryExhausted(_) => ErrorSeverity::Warning,
            BalekaError::Validation(_) => ErrorSeverity::Info,
            BalekaError::DateParse { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// True for the "row is absent" family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BalekaError::AthleteNotFound { .. }
                | BalekaError::ClubNotFound { .. }
                | BalekaError::MemberNotFound { .. }
                | BalekaError::MembershipNotFound { .. }
                | BalekaError::RunNotFound { .. }
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
