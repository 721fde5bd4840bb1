//! Storage session contract
//!
//! A [`Session`] is the unit-of-work handle a repository owns. Reads return flat
//! rows for a whole table; writes are staged as [`Change`]s and applied together
//! by [`Session::commit`]. A commit either applies everything or reports the
//! optimistic-concurrency conflicts it found, leaving the staged changes in place
//! so the caller can reconcile and retry.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Athlete, Club, ClubMember, Event, EventRegistration, Run};
use crate::utils::errors::Result;

/// Persisted entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Athlete,
    Club,
    ClubMember,
    Run,
    Event,
    EventRegistration,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Athlete => "Athlete",
            EntityKind::Club => "Club",
            EntityKind::ClubMember => "ClubMember",
            EntityKind::Run => "Run",
            EntityKind::Event => "Event",
            EntityKind::EventRegistration => "EventRegistration",
        };
        f.write_str(name)
    }
}

/// One row of any table
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Athlete(Athlete),
    Club(Club),
    ClubMember(ClubMember),
    Run(Run),
    Event(Event),
    EventRegistration(EventRegistration),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Athlete(_) => EntityKind::Athlete,
            Record::Club(_) => EntityKind::Club,
            Record::ClubMember(_) => EntityKind::ClubMember,
            Record::Run(_) => EntityKind::Run,
            Record::Event(_) => EntityKind::Event,
            Record::EventRegistration(_) => EntityKind::EventRegistration,
        }
    }

    /// Primary key; 0 until the store assigns one on insert
    pub fn key(&self) -> i64 {
        match self {
            Record::Athlete(a) => a.athlete_id,
            Record::Club(c) => c.club_id,
            Record::ClubMember(m) => m.member_id,
            Record::Run(r) => r.run_id,
            Record::Event(e) => e.event_id,
            Record::EventRegistration(r) => r.registration_id,
        }
    }

    pub fn set_key(&mut self, key: i64) {
        match self {
            Record::Athlete(a) => a.athlete_id = key,
            Record::Club(c) => c.club_id = key,
            Record::ClubMember(m) => m.member_id = key,
            Record::Run(r) => r.run_id = key,
            Record::Event(e) => e.event_id = key,
            Record::EventRegistration(r) => r.registration_id = key,
        }
    }

    /// Persisted properties by column name. Query-attached collections are excluded.
    pub fn fields(&self) -> Result<Map<String, Value>> {
        let value = match self {
            Record::Athlete(a) => {
                let mut value = serde_json::to_value(a)?;
                if let Value::Object(map) = &mut value {
                    map.insert("password_hash".to_string(), Value::String(a.password_hash.clone()));
                }
                value
            }
            Record::Club(c) => serde_json::to_value(c)?,
            Record::ClubMember(m) => serde_json::to_value(m)?,
            Record::Run(r) => serde_json::to_value(r)?,
            Record::Event(e) => serde_json::to_value(e)?,
            Record::EventRegistration(r) => serde_json::to_value(r)?,
        };

        let mut map = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.remove("members");
        map.remove("athlete");
        Ok(map)
    }
}

/// A pending write
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(Record),
    /// `original` is the row as this session read it; used for conflict detection
    Update { original: Record, proposed: Record },
}

impl Change {
    pub fn kind(&self) -> EntityKind {
        match self {
            Change::Insert(record) => record.kind(),
            Change::Update { proposed, .. } => proposed.kind(),
        }
    }

    pub fn key(&self) -> i64 {
        match self {
            Change::Insert(record) => record.key(),
            Change::Update { proposed, .. } => proposed.key(),
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            Change::Insert(record) => record,
            Change::Update { proposed, .. } => proposed,
        }
    }
}

/// Stored vs. proposed value of one property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyConflict {
    pub name: String,
    pub original: Value,
    pub proposed: Value,
}

/// A staged change the store refused because the row moved underneath it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictEntry {
    pub kind: EntityKind,
    pub key: i64,
    pub properties: Vec<PropertyConflict>,
}

impl ConflictEntry {
    /// Build an entry from the row currently stored and the row this session wants to write.
    /// Only properties changed by the other writer (`stored != loaded`) are listed.
    pub fn diff(loaded: &Record, stored: &Record, proposed: &Record) -> Result<Option<Self>> {
        let loaded = loaded.fields()?;
        let stored_fields = stored.fields()?;
        let proposed_fields = proposed.fields()?;

        let properties: Vec<PropertyConflict> = stored_fields
            .iter()
            .filter(|(name, value)| loaded.get(name.as_str()) != Some(*value))
            .map(|(name, value)| PropertyConflict {
                name: name.clone(),
                original: value.clone(),
                proposed: proposed_fields.get(name.as_str()).cloned().unwrap_or(Value::Null),
            })
            .collect();

        if properties.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            kind: stored.kind(),
            key: stored.key(),
            properties,
        }))
    }

    /// True once every property's original value equals its proposed value
    pub fn is_settled(&self) -> bool {
        self.properties.iter().all(|p| p.original == p.proposed)
    }
}

/// Result of a commit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// All staged changes applied; keys assigned to inserts, in staging order
    Committed { inserted: Vec<(EntityKind, i64)> },
    /// Nothing applied; staged changes are kept for reconciliation
    Conflict(Vec<ConflictEntry>),
}

/// Unit-of-work handle over the relational store
#[async_trait]
pub trait Session: Send {
    async fn athletes(&mut self) -> Result<Vec<Athlete>>;

    async fn clubs(&mut self) -> Result<Vec<Club>>;

    async fn club_members(&mut self) -> Result<Vec<ClubMember>>;

    async fn runs(&mut self) -> Result<Vec<Run>>;

    async fn events(&mut self) -> Result<Vec<Event>>;

    async fn event_registrations(&mut self) -> Result<Vec<EventRegistration>>;

    fn stage(&mut self, change: Change);

    /// Number of staged, uncommitted changes
    fn pending(&self) -> usize;

    /// Apply everything staged. On `Conflict` the staged changes are kept for
    /// reconciliation; on `Err` they are dropped.
    async fn commit(&mut self) -> Result<CommitOutcome>;

    /// Adopt reconciled conflict entries: the matching staged changes are written
    /// on the next commit without re-checking the stored row.
    fn accept_proposed(&mut self, entries: &[ConflictEntry]);

    /// Drop all staged changes
    fn discard(&mut self);
}

/// Source of sessions. Each repository gets its own.
pub trait Store: Clone + Send + Sync + 'static {
    type Session: Session + 'static;

    fn session(&self) -> Self::Session;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(distance: f64) -> Run {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        Run {
            run_id: 4,
            athlete_id: 1,
            event_id: 0,
            route_id: 2,
            start_time: start,
            end_time: start + chrono::Duration::minutes(40),
            distance,
            calories_burnt: 100.0,
            deleted: false,
        }
    }

    #[test]
    fn test_diff_lists_properties_changed_by_other_writer() {
        let loaded = Record::Run(run(5.0));
        let stored = Record::Run(run(6.0));
        let proposed = Record::Run(run(7.0));

        let entry = ConflictEntry::diff(&loaded, &stored, &proposed).unwrap().unwrap();
        assert_eq!(entry.kind, EntityKind::Run);
        assert_eq!(entry.key, 4);
        assert_eq!(entry.properties.len(), 1);
        assert_eq!(entry.properties[0].name, "distance");
        assert_eq!(entry.properties[0].original, serde_json::json!(6.0));
        assert_eq!(entry.properties[0].proposed, serde_json::json!(7.0));
        assert!(!entry.is_settled());
    }

    #[test]
    fn test_diff_without_concurrent_change_is_none() {
        let loaded = Record::Run(run(5.0));
        let proposed = Record::Run(run(7.0));
        assert!(ConflictEntry::diff(&loaded, &loaded, &proposed).unwrap().is_none());
    }

    #[test]
    fn test_fields_exclude_attached_members() {
        let club = Club {
            club_id: 1,
            name: "Road Runners".to_string(),
            description: None,
            location: None,
            date_created: Utc::now(),
            user_id: "u1".to_string(),
            deleted: false,
            members: vec![],
        };
        let fields = Record::Club(club).fields().unwrap();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("members"));
    }
}
