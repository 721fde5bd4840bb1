//! Event repository implementation

use chrono::{DateTime, Utc};
use tracing::info;

use crate::database::conflict::commit;
use crate::database::session::{Change, EntityKind, Record, Session};
use crate::models::event::{Event, EventRegistration, EventStatus};
use crate::query::single_or_none;
use crate::utils::errors::Result;

pub struct EventRepository<S: Session> {
    session: S,
}

impl<S: Session> EventRepository<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Non-deleted events ordered by date
    pub async fn events(&mut self) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .session
            .events()
            .await?
            .into_iter()
            .filter(|e| !e.deleted)
            .collect();
        events.sort_by_key(|e| (e.event_date, e.event_id));
        Ok(events)
    }

    pub async fn event_by_id(&mut self, event_id: i64) -> Result<Option<Event>> {
        let events = self.events().await?;
        single_or_none(
            events.into_iter().filter(|e| e.event_id == event_id),
            EntityKind::Event,
            || format!("event_id = {}", event_id),
        )
    }

    pub async fn registrations_by_route(&mut self, route_id: i64) -> Result<Vec<EventRegistration>> {
        let mut registrations: Vec<EventRegistration> = self
            .session
            .event_registrations()
            .await?
            .into_iter()
            .filter(|r| !r.deleted && r.route_id == route_id)
            .collect();
        registrations.sort_by_key(|r| r.registration_id);
        Ok(registrations)
    }

    /// Activate every pending event whose date has arrived. Returns how many
    /// events changed; a second call with the same `now` returns 0.
    pub async fn process_events(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let due: Vec<Event> = self
            .events()
            .await?
            .into_iter()
            .filter(|e| e.is_due(now))
            .collect();

        if due.is_empty() {
            return Ok(0);
        }

        for original in &due {
            let mut activated = original.clone();
            activated.status = EventStatus::Active;
            self.session.stage(Change::Update {
                original: Record::Event(original.clone()),
                proposed: Record::Event(activated),
            });
        }
        commit(&mut self.session).await?;

        for event in &due {
            info!(event_id = event.event_id, title = %event.title, "Event activated");
        }
        Ok(due.len())
    }
}
