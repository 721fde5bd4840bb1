//! Database module
//!
//! Unit-of-work sessions, the Postgres and in-memory stores, conflict
//! resolution and the repositories built on top of them.

pub mod conflict;
pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repositories;
pub mod service;
pub mod session;

pub use conflict::{commit, commit_resolving, ConflictResolver, Resolution};
pub use connection::{create_pool, health_check, run_migrations, DatabasePool};
pub use memory::{MemorySession, MemoryStore};
pub use postgres::{PgSession, PgStore};
pub use repositories::{AthleteRepository, ClubRepository, EventRepository, RunRepository};
pub use service::DatabaseService;
pub use session::{Change, CommitOutcome, ConflictEntry, EntityKind, PropertyConflict, Record, Session, Store};
