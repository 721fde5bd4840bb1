//! Athlete service implementation

use tracing::debug;

use crate::database::conflict::commit;
use crate::database::repositories::AthleteRepository;
use crate::database::session::Session;
use crate::models::athlete::{Athlete, ChangePasswordRequest, CreateAthleteRequest, UpdateAthleteRequest};
use crate::utils::errors::Result;

pub struct AthleteService<S: Session> {
    athlete_repository: AthleteRepository<S>,
}

impl<S: Session> AthleteService<S> {
    pub fn new(athlete_repository: AthleteRepository<S>) -> Self {
        Self { athlete_repository }
    }

    pub async fn get_athletes(&mut self) -> Result<Vec<Athlete>> {
        self.athlete_repository.all().await
    }

    pub async fn get_athlete_by_id(&mut self, athlete_id: i64) -> Result<Option<Athlete>> {
        debug!(athlete_id = athlete_id, "Getting athlete by ID");
        self.athlete_repository.athlete_by_id(athlete_id).await
    }

    pub async fn add_athlete(&mut self, request: CreateAthleteRequest) -> Result<Athlete> {
        self.athlete_repository.add_athlete(request).await
    }

    pub async fn update_athlete(&mut self, request: UpdateAthleteRequest) -> Result<Athlete> {
        self.athlete_repository.update_athlete(request).await
    }

    pub async fn change_password(&mut self, request: ChangePasswordRequest) -> Result<Athlete> {
        self.athlete_repository.change_password(request).await
    }

    pub async fn login_athlete(&mut self, username: &str, password: &str) -> Result<Athlete> {
        self.athlete_repository.login_athlete(username, password).await
    }

    pub async fn delete_athlete(&mut self, athlete_id: i64) -> Result<()> {
        self.athlete_repository.delete_athlete(athlete_id).await
    }

    /// Commit anything still staged on the athlete session
    pub async fn save(&mut self) -> Result<()> {
        commit(self.athlete_repository.session_mut()).await?;
        Ok(())
    }
}
