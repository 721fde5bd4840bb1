//! Services module
//!
//! Thin services over the repositories. Each call maps to one repository
//! operation; `save` commits whatever is still staged.

pub mod athlete;
pub mod club;
pub mod event;
pub mod run;

pub use athlete::AthleteService;
pub use club::ClubService;
pub use event::EventService;
pub use run::RunService;

use crate::config::settings::Settings;
use crate::database::repositories::{AthleteRepository, ClubRepository, EventRepository, RunRepository};
use crate::database::session::Store;

/// Service factory for creating and managing all services
pub struct ServiceFactory<St: Store> {
    pub athlete_service: AthleteService<St::Session>,
    pub club_service: ClubService<St::Session>,
    pub run_service: RunService<St::Session>,
    pub event_service: EventService<St::Session>,
}

impl<St: Store> ServiceFactory<St> {
    /// Create every service over its own session of `store`
    pub fn new(store: &St, settings: &Settings) -> Self {
        let athletes = AthleteRepository::new(store.session())
            .with_min_password_length(settings.athletes.min_password_length);

        Self {
            athlete_service: AthleteService::new(athletes),
            club_service: ClubService::new(ClubRepository::new(store.session())),
            run_service: RunService::new(RunRepository::new(store.session())),
            event_service: EventService::new(EventRepository::new(store.session())),
        }
    }

    /// Commit pending work on every service
    pub async fn save_all(&mut self) -> crate::utils::errors::Result<()> {
        self.athlete_service.save().await?;
        self.club_service.save().await?;
        self.run_service.save().await?;
        self.event_service.save().await?;
        Ok(())
    }
}
