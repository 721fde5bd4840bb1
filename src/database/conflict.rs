//! Optimistic-concurrency conflict resolution
//!
//! Only club creation reconciles conflicts. Club entries are settled last-writer-wins
//! (every original value takes the proposed value) and the commit is retried once.
//! An entry for any other entity kind cannot be reconciled.

use tracing::{debug, warn};

use crate::database::session::{CommitOutcome, ConflictEntry, EntityKind, Session};
use crate::utils::errors::{BalekaError, Result};
use crate::utils::logging::log_conflict_resolution;

/// Outcome of resolving a set of conflict entries
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Entries rewritten so the proposed values win
    Resolved(Vec<ConflictEntry>),
    /// The first entry whose kind has no resolution policy
    Unsupported(EntityKind),
}

/// Last-writer-wins resolver for club entries
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn supports(&self, kind: EntityKind) -> bool {
        kind == EntityKind::Club
    }

    pub fn resolve(&self, entries: Vec<ConflictEntry>) -> Resolution {
        if let Some(entry) = entries.iter().find(|e| !self.supports(e.kind)) {
            return Resolution::Unsupported(entry.kind);
        }

        let resolved = entries
            .into_iter()
            .map(|mut entry| {
                for property in &mut entry.properties {
                    property.original = property.proposed.clone();
                }
                entry
            })
            .collect();

        Resolution::Resolved(resolved)
    }
}

/// Run one commit attempt. A failed attempt drops everything staged so the
/// next operation on the session starts clean.
async fn attempt<S: Session + ?Sized>(session: &mut S) -> Result<CommitOutcome> {
    match session.commit().await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            warn!(error = %e, pending = session.pending(), "Commit failed, discarding staged changes");
            session.discard();
            Err(e)
        }
    }
}

/// Commit staged changes. Conflicts are errors: this path has no reconciliation.
pub async fn commit<S: Session + ?Sized>(session: &mut S) -> Result<Vec<(EntityKind, i64)>> {
    match attempt(session).await? {
        CommitOutcome::Committed { inserted } => Ok(inserted),
        CommitOutcome::Conflict(entries) => {
            session.discard();
            match entries.into_iter().next() {
                Some(entry) => Err(BalekaError::ConcurrencyConflict {
                    entity: entry.kind,
                    key: entry.key,
                }),
                None => Err(BalekaError::CommitRejected),
            }
        }
    }
}

/// Commit staged changes, resolving conflicts once and retrying exactly once.
pub async fn commit_resolving<S: Session + ?Sized>(
    session: &mut S,
    resolver: &ConflictResolver,
) -> Result<Vec<(EntityKind, i64)>> {
    let entries = match attempt(session).await? {
        CommitOutcome::Committed { inserted } => return Ok(inserted),
        CommitOutcome::Conflict(entries) if entries.is_empty() => {
            session.discard();
            return Err(BalekaError::CommitRejected);
        }
        CommitOutcome::Conflict(entries) => entries,
    };

    let conflicts = entries.len();
    match resolver.resolve(entries) {
        Resolution::Unsupported(kind) => {
            warn!(entity = %kind, "Unsupported concurrency conflict, discarding staged changes");
            session.discard();
            log_conflict_resolution(kind, conflicts, false);
            Err(BalekaError::UnsupportedConflict(kind))
        }
        Resolution::Resolved(resolved) => {
            log_conflict_resolution(EntityKind::Club, conflicts, true);
            session.accept_proposed(&resolved);
            debug!(entries = resolved.len(), "Retrying commit after conflict resolution");

            match attempt(session).await? {
                CommitOutcome::Committed { inserted } => Ok(inserted),
                CommitOutcome::Conflict(remaining) => {
                    session.discard();
                    Err(BalekaError::ConflictRetryExhausted(remaining.len()))
                }
            }
        }
    }
}
