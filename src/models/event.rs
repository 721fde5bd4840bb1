//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub event_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    pub status: EventStatus,
    pub deleted: bool,
}

/// Registration of an athlete for an event, tied to the route the event is run on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub registration_id: i64,
    pub event_id: i64,
    pub athlete_id: i64,
    pub route_id: i64,
    pub date_registered: DateTime<Utc>,
    pub deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Active,
    Closed,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Pending => write!(f, "pending"),
            EventStatus::Active => write!(f, "active"),
            EventStatus::Closed => write!(f, "closed"),
        }
    }
}

impl Event {
    /// Pending, visible events whose date has arrived
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.deleted && self.status == EventStatus::Pending && self.event_date <= now
    }
}
