//! Run service implementation

use crate::database::conflict::commit;
use crate::database::repositories::RunRepository;
use crate::database::session::Session;
use crate::models::run::{CreateRunRequest, Run, UpdateRunRequest};
use crate::utils::errors::Result;

pub struct RunService<S: Session> {
    run_repository: RunRepository<S>,
}

impl<S: Session> RunService<S> {
    pub fn new(run_repository: RunRepository<S>) -> Self {
        Self { run_repository }
    }

    pub async fn get_run_by_id(&mut self, run_id: i64) -> Result<Option<Run>> {
        self.run_repository.run_by_id(run_id).await
    }

    pub async fn get_all_runs(&mut self, athlete_id: i64) -> Result<Vec<Run>> {
        self.run_repository.all_runs(athlete_id).await
    }

    pub async fn get_athlete_event_runs(&mut self, athlete_id: i64) -> Result<Vec<Run>> {
        self.run_repository.athlete_event_runs(athlete_id).await
    }

    pub async fn get_athlete_personal_runs(&mut self, athlete_id: i64) -> Result<Vec<Run>> {
        self.run_repository.athlete_personal_runs(athlete_id).await
    }

    pub async fn get_event_runs(&mut self, event_id: i64) -> Result<Vec<Run>> {
        self.run_repository.event_runs(event_id).await
    }

    pub async fn get_route_runs(&mut self, route_id: i64) -> Result<Vec<Run>> {
        self.run_repository.route_runs(route_id).await
    }

    pub async fn get_route_run_count(&mut self, route_id: i64) -> Result<usize> {
        self.run_repository.route_run_count(route_id).await
    }

    pub async fn get_total_distance_ran(&mut self, athlete_id: i64) -> Result<f64> {
        self.run_repository.total_distance_ran(athlete_id).await
    }

    pub async fn get_run_count(&mut self, athlete_id: i64) -> Result<usize> {
        self.run_repository.run_count(athlete_id).await
    }

    pub async fn get_event_run_count(&mut self, athlete_id: i64) -> Result<usize> {
        self.run_repository.event_run_count(athlete_id).await
    }

    pub async fn get_personal_run_count(&mut self, athlete_id: i64) -> Result<usize> {
        self.run_repository.personal_run_count(athlete_id).await
    }

    pub async fn get_distance_over_time(&mut self, athlete_id: i64, start: &str, end: &str) -> Result<f64> {
        self.run_repository.distance_over_time(athlete_id, start, end).await
    }

    pub async fn get_calories_over_time(&mut self, athlete_id: i64, start: &str, end: &str) -> Result<f64> {
        self.run_repository.calories_over_time(athlete_id, start, end).await
    }

    pub async fn add_run(&mut self, request: CreateRunRequest) -> Result<Run> {
        self.run_repository.add_run(request).await
    }

    pub async fn update_run(&mut self, request: UpdateRunRequest) -> Result<Run> {
        self.run_repository.update_run(request).await
    }

    pub async fn delete_run(&mut self, run_id: i64) -> Result<()> {
        self.run_repository.delete(run_id).await
    }

    pub async fn save(&mut self) -> Result<()> {
        commit(self.run_repository.session_mut()).await?;
        Ok(())
    }
}
