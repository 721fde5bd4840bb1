//! In-memory store
//!
//! [`MemoryStore`] keeps every table in a shared map and hands out
//! [`MemorySession`]s that behave like the PostgreSQL adapter: staged changes,
//! all-or-nothing commits and conflict detection against the rows a session
//! originally read. Tests can force conflicts with [`MemoryStore::inject_conflict`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::database::session::{
    Change, CommitOutcome, ConflictEntry, EntityKind, PropertyConflict, Record, Session, Store,
};
use crate::models::{Athlete, Club, ClubMember, Event, EventRegistration, Run};
use crate::utils::errors::Result;

#[derive(Default)]
struct Tables {
    rows: HashMap<EntityKind, BTreeMap<i64, Record>>,
    next_key: HashMap<EntityKind, i64>,
    injected: Vec<EntityKind>,
}

impl Tables {
    fn table(&self, kind: EntityKind) -> impl Iterator<Item = &Record> {
        self.rows.get(&kind).into_iter().flat_map(|rows| rows.values())
    }

    fn get(&self, kind: EntityKind, key: i64) -> Option<&Record> {
        self.rows.get(&kind).and_then(|rows| rows.get(&key))
    }

    fn allocate(&mut self, kind: EntityKind) -> i64 {
        let next = self.next_key.entry(kind).or_insert(0);
        *next += 1;
        *next
    }

    fn put(&mut self, mut record: Record) -> i64 {
        let kind = record.kind();
        let key = if record.key() > 0 {
            let next = self.next_key.entry(kind).or_insert(0);
            *next = (*next).max(record.key());
            record.key()
        } else {
            let key = self.allocate(kind);
            record.set_key(key);
            key
        };
        self.rows.entry(kind).or_default().insert(key, record);
        key
    }

    fn take_injected(&mut self, kind: EntityKind) -> bool {
        match self.injected.iter().position(|k| *k == kind) {
            Some(index) => {
                self.injected.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Shared in-memory tables
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a row directly, bypassing sessions. A zero key is assigned.
    pub fn insert(&self, record: Record) -> i64 {
        self.write().put(record)
    }

    /// Make the next commit touching `kind` report a conflict, once
    pub fn inject_conflict(&self, kind: EntityKind) {
        self.write().injected.push(kind);
    }

    pub fn row(&self, kind: EntityKind, key: i64) -> Option<Record> {
        self.read().get(kind, key).cloned()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.read().table(kind).count()
    }

    pub fn all_clubs(&self) -> Vec<Club> {
        load(&self.read(), EntityKind::Club, |r| match r {
            Record::Club(c) => Some(c.clone()),
            _ => None,
        })
    }

    pub fn all_club_members(&self) -> Vec<ClubMember> {
        load(&self.read(), EntityKind::ClubMember, |r| match r {
            Record::ClubMember(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn all_runs(&self) -> Vec<Run> {
        load(&self.read(), EntityKind::Run, |r| match r {
            Record::Run(run) => Some(run.clone()),
            _ => None,
        })
    }
}

impl Store for MemoryStore {
    type Session = MemorySession;

    fn session(&self) -> MemorySession {
        MemorySession {
            store: self.clone(),
            staged: Vec::new(),
        }
    }
}

fn load<T>(tables: &Tables, kind: EntityKind, pick: impl Fn(&Record) -> Option<T>) -> Vec<T> {
    tables.table(kind).filter_map(pick).collect()
}

#[derive(Debug, Clone)]
struct Staged {
    change: Change,
    force: bool,
}

/// Unit of work over a [`MemoryStore`]
pub struct MemorySession {
    store: MemoryStore,
    staged: Vec<Staged>,
}

impl MemorySession {
    fn detect_conflicts(&self, tables: &mut Tables) -> Result<Vec<ConflictEntry>> {
        let mut conflicts = Vec::new();

        for staged in &self.staged {
            if staged.force {
                continue;
            }

            let kind = staged.change.kind();
            if tables.take_injected(kind) {
                conflicts.push(injected_entry(staged.change.record())?);
                continue;
            }

            if let Change::Update { original, proposed } = &staged.change {
                if let Some(stored) = tables.get(kind, proposed.key()) {
                    if let Some(entry) = ConflictEntry::diff(original, stored, proposed)? {
                        conflicts.push(entry);
                    }
                }
            }
        }

        Ok(conflicts)
    }
}

fn injected_entry(record: &Record) -> Result<ConflictEntry> {
    let properties = record
        .fields()?
        .into_iter()
        .map(|(name, proposed)| PropertyConflict {
            name,
            original: serde_json::Value::Null,
            proposed,
        })
        .collect();

    Ok(ConflictEntry {
        kind: record.kind(),
        key: record.key(),
        properties,
    })
}

#[async_trait]
impl Session for MemorySession {
    async fn athletes(&mut self) -> Result<Vec<Athlete>> {
        Ok(load(&self.store.read(), EntityKind::Athlete, |r| match r {
            Record::Athlete(a) => Some(a.clone()),
            _ => None,
        }))
    }

    async fn clubs(&mut self) -> Result<Vec<Club>> {
        Ok(self.store.all_clubs())
    }

    async fn club_members(&mut self) -> Result<Vec<ClubMember>> {
        Ok(self.store.all_club_members())
    }

    async fn runs(&mut self) -> Result<Vec<Run>> {
        Ok(self.store.all_runs())
    }

    async fn events(&mut self) -> Result<Vec<Event>> {
        Ok(load(&self.store.read(), EntityKind::Event, |r| match r {
            Record::Event(e) => Some(e.clone()),
            _ => None,
        }))
    }

    async fn event_registrations(&mut self) -> Result<Vec<EventRegistration>> {
        Ok(load(&self.store.read(), EntityKind::EventRegistration, |r| match r {
            Record::EventRegistration(reg) => Some(reg.clone()),
            _ => None,
        }))
    }

    fn stage(&mut self, change: Change) {
        trace!(entity = %change.kind(), key = change.key(), "Staging change");
        self.staged.push(Staged { change, force: false });
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    async fn commit(&mut self) -> Result<CommitOutcome> {
        let store = self.store.clone();
        let mut tables = store.write();

        let conflicts = match self.detect_conflicts(&mut tables) {
            Ok(conflicts) => conflicts,
            Err(e) => {
                self.staged.clear();
                return Err(e);
            }
        };
        if !conflicts.is_empty() {
            debug!(conflicts = conflicts.len(), "Commit rejected with conflicts");
            return Ok(CommitOutcome::Conflict(conflicts));
        }

        let mut inserted = Vec::new();
        for staged in self.staged.drain(..) {
            match staged.change {
                Change::Insert(mut record) => {
                    record.set_key(0);
                    let kind = record.kind();
                    let key = tables.put(record);
                    inserted.push((kind, key));
                }
                Change::Update { proposed, .. } => {
                    tables.put(proposed);
                }
            }
        }

        debug!(inserted = inserted.len(), "Commit applied");
        Ok(CommitOutcome::Committed { inserted })
    }

    fn accept_proposed(&mut self, entries: &[ConflictEntry]) {
        for staged in &mut self.staged {
            let kind = staged.change.kind();
            let key = staged.change.key();
            if entries.iter().any(|e| e.kind == kind && e.key == key && e.is_settled()) {
                staged.force = true;
            }
        }
    }

    fn discard(&mut self) {
        self.staged.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn club(name: &str) -> Club {
        Club {
            club_id: 0,
            name: name.to_string(),
            description: None,
            location: None,
            date_created: Utc::now(),
            user_id: "u1".to_string(),
            deleted: false,
            members: vec![],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_keys() {
        let store = MemoryStore::new();
        let mut session = store.session();
        session.stage(Change::Insert(Record::Club(club("A"))));
        session.stage(Change::Insert(Record::Club(club("B"))));

        let outcome = session.commit().await.unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::Committed {
                inserted: vec![(EntityKind::Club, 1), (EntityKind::Club, 2)]
            }
        );
        assert_eq!(session.pending(), 0);
        assert_eq!(session.clubs().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_update_conflicts_and_keeps_staged_changes() {
        let store = MemoryStore::new();
        let key = store.insert(Record::Club(club("Original")));
        let loaded = store.all_clubs().remove(0);

        let mut other = loaded.clone();
        other.name = "Other writer".to_string();
        store.insert(Record::Club(other));

        let mut mine = loaded.clone();
        mine.location = Some("Durban".to_string());

        let mut session = store.session();
        session.stage(Change::Update {
            original: Record::Club(loaded),
            proposed: Record::Club(mine),
        });

        match session.commit().await.unwrap() {
            CommitOutcome::Conflict(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].key, key);
                assert_eq!(entries[0].properties[0].name, "name");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(session.pending(), 1);
    }

    #[tokio::test]
    async fn test_injected_conflict_fires_once() {
        let store = MemoryStore::new();
        store.inject_conflict(EntityKind::Club);

        let mut session = store.session();
        session.stage(Change::Insert(Record::Club(club("A"))));
        assert!(matches!(session.commit().await.unwrap(), CommitOutcome::Conflict(_)));
        assert!(matches!(session.commit().await.unwrap(), CommitOutcome::Committed { .. }));
        assert_eq!(store.count(EntityKind::Club), 1);
    }
}
