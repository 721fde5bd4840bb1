//! Database service layer
//!
//! Bundles one repository per entity, each over its own session of the same store.

use crate::database::repositories::{AthleteRepository, ClubRepository, EventRepository, RunRepository};
use crate::database::session::Store;
use crate::query::RunStats;
use crate::utils::errors::{BalekaError, Result};

pub struct DatabaseService<St: Store> {
    pub athletes: AthleteRepository<St::Session>,
    pub clubs: ClubRepository<St::Session>,
    pub runs: RunRepository<St::Session>,
    pub events: EventRepository<St::Session>,
    store: St,
}

impl<St: Store> DatabaseService<St> {
    pub fn new(store: St) -> Self {
        Self {
            athletes: AthleteRepository::new(store.session()),
            clubs: ClubRepository::new(store.session()),
            runs: RunRepository::new(store.session()),
            events: EventRepository::new(store.session()),
            store,
        }
    }

    pub fn with_min_password_length(mut self, min_password_length: usize) -> Self {
        self.athletes = self.athletes.with_min_password_length(min_password_length);
        self
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// Athlete profile, owned clubs and running totals in one document
    pub async fn athlete_dashboard(&mut self, athlete_id: i64) -> Result<serde_json::Value> {
        let athlete = self
            .athletes
            .athlete_by_id(athlete_id)
            .await?
            .ok_or(BalekaError::AthleteNotFound { athlete_id })?;

        let clubs = self.clubs.user_clubs(&athlete.username).await?;
        let runs = self.runs.all_runs(athlete_id).await?;

        let dashboard = serde_json::json!({
            "athlete": athlete,
            "clubs": clubs,
            "stats": {
                "total_distance": runs.total_distance(),
                "run_count": runs.run_count(),
                "event_run_count": runs.event_run_count(),
                "personal_run_count": runs.personal_run_count(),
            },
            "generated_at": chrono::Utc::now(),
        });

        Ok(dashboard)
    }
}
