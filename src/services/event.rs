//! Event service implementation

use chrono::{DateTime, Utc};

use crate::database::conflict::commit;
use crate::database::repositories::EventRepository;
use crate::database::session::Session;
use crate::models::event::{Event, EventRegistration};
use crate::utils::errors::Result;

pub struct EventService<S: Session> {
    event_repository: EventRepository<S>,
}

impl<S: Session> EventService<S> {
    pub fn new(event_repository: EventRepository<S>) -> Self {
        Self { event_repository }
    }

    pub async fn get_events(&mut self) -> Result<Vec<Event>> {
        self.event_repository.events().await
    }

    pub async fn get_event_by_id(&mut self, event_id: i64) -> Result<Option<Event>> {
        self.event_repository.event_by_id(event_id).await
    }

    pub async fn get_registrations_by_route(&mut self, route_id: i64) -> Result<Vec<EventRegistration>> {
        self.event_repository.registrations_by_route(route_id).await
    }

    pub async fn process_events(&mut self, now: DateTime<Utc>) -> Result<usize> {
        self.event_repository.process_events(now).await
    }

    pub async fn save(&mut self) -> Result<()> {
        commit(self.event_repository.session_mut()).await?;
        Ok(())
    }
}
