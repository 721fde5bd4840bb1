//! Baleka
//!
//! Data-access layer for a running community: athletes, clubs and their
//! memberships, logged runs and scheduled events. Reads go through soft-delete
//! aware queries, writes go through unit-of-work sessions with optimistic
//! conflict detection, backed by Postgres or an in-memory store.

pub mod config;
pub mod database;
pub mod models;
pub mod query;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{BalekaError, Result};

pub use database::{DatabaseService, MemoryStore, PgStore, Session, Store};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
