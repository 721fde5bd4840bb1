//! Run repository implementation

use chrono::{DateTime, Utc};

use crate::database::conflict::commit;
use crate::database::session::{Change, EntityKind, Record, Session};
use crate::models::run::{CreateRunRequest, Run, UpdateRunRequest};
use crate::query::{self, RunStats};
use crate::utils::errors::{BalekaError, Result};
use crate::utils::logging::log_run_action;

pub struct RunRepository<S: Session> {
    session: S,
}

impl<S: Session> RunRepository<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// All non-deleted runs
    pub async fn runs_query(&mut self) -> Result<Vec<Run>> {
        let runs = self.session.runs().await?;
        Ok(query::active_runs(&runs))
    }

    /// Non-deleted runs of one athlete
    pub async fn athlete_runs_query(&mut self, athlete_id: i64) -> Result<Vec<Run>> {
        let runs = self.runs_query().await?;
        Ok(query::runs_by_athlete(&runs, athlete_id))
    }

    pub async fn run_by_id(&mut self, run_id: i64) -> Result<Option<Run>> {
        let runs = self.runs_query().await?;
        query::run_by_id(&runs, run_id)
    }

    pub async fn all_runs(&mut self, athlete_id: i64) -> Result<Vec<Run>> {
        self.athlete_runs_query(athlete_id).await
    }

    pub async fn athlete_event_runs(&mut self, athlete_id: i64) -> Result<Vec<Run>> {
        let runs = self.athlete_runs_query(athlete_id).await?;
        Ok(query::event_runs(&runs))
    }

    pub async fn athlete_personal_runs(&mut self, athlete_id: i64) -> Result<Vec<Run>> {
        let runs = self.athlete_runs_query(athlete_id).await?;
        Ok(query::personal_runs(&runs))
    }

    pub async fn event_runs(&mut self, event_id: i64) -> Result<Vec<Run>> {
        let runs = self.runs_query().await?;
        Ok(query::runs_by_event(&runs, event_id))
    }

    pub async fn route_runs(&mut self, route_id: i64) -> Result<Vec<Run>> {
        let runs = self.runs_query().await?;
        Ok(query::runs_by_route(&runs, route_id))
    }

    /// Runs on a route, including event runs registered against it
    pub async fn route_run_count(&mut self, route_id: i64) -> Result<usize> {
        let runs = self.runs_query().await?;
        let registrations = self.session.event_registrations().await?;
        Ok(query::route_run_count(&runs, &registrations, route_id))
    }

    pub async fn total_distance_ran(&mut self, athlete_id: i64) -> Result<f64> {
        Ok(self.athlete_runs_query(athlete_id).await?.total_distance())
    }

    pub async fn run_count(&mut self, athlete_id: i64) -> Result<usize> {
        Ok(self.athlete_runs_query(athlete_id).await?.run_count())
    }

    pub async fn event_run_count(&mut self, athlete_id: i64) -> Result<usize> {
        Ok(self.athlete_runs_query(athlete_id).await?.event_run_count())
    }

    pub async fn personal_run_count(&mut self, athlete_id: i64) -> Result<usize> {
        Ok(self.athlete_runs_query(athlete_id).await?.personal_run_count())
    }

    pub async fn distance_over_time(&mut self, athlete_id: i64, start: &str, end: &str) -> Result<f64> {
        self.athlete_runs_query(athlete_id).await?.distance_over_time(start, end)
    }

    pub async fn calories_over_time(&mut self, athlete_id: i64, start: &str, end: &str) -> Result<f64> {
        self.athlete_runs_query(athlete_id).await?.calories_over_time(start, end)
    }

    /// Log a new run. Exactly one of event/route must be set.
    pub async fn add_run(&mut self, request: CreateRunRequest) -> Result<Run> {
        validate_new_run(&request)?;
        self.require_athlete(request.athlete_id).await?;

        let run = Run {
            run_id: 0,
            athlete_id: request.athlete_id,
            event_id: request.event_id.max(0),
            route_id: request.route_id.max(0),
            start_time: request.start_time,
            end_time: request.end_time,
            distance: request.distance,
            calories_burnt: request.calories_burnt,
            deleted: false,
        };

        self.session.stage(Change::Insert(Record::Run(run.clone())));
        let inserted = commit(&mut self.session).await?;

        let run_id = inserted
            .into_iter()
            .find(|(kind, _)| *kind == EntityKind::Run)
            .map(|(_, key)| key)
            .unwrap_or_default();

        log_run_action(run_id, "added", run.athlete_id);
        Ok(Run { run_id, ..run })
    }

    /// Overwrite a run's timing, distance, owner and calories. Only one category
    /// field moves per update: `event_id` when the incoming `route_id <= 0`,
    /// otherwise `route_id`.
    pub async fn update_run(&mut self, request: UpdateRunRequest) -> Result<Run> {
        validate_run_fields(
            request.athlete_id,
            request.start_time,
            request.end_time,
            request.distance,
            request.calories_burnt,
        )?;

        let original = self
            .run_by_id(request.run_id)
            .await?
            .ok_or(BalekaError::RunNotFound { run_id: request.run_id })?;
        self.require_athlete(request.athlete_id).await?;

        let mut updated = original.clone();
        updated.start_time = request.start_time;
        updated.end_time = request.end_time;
        updated.distance = request.distance;
        updated.athlete_id = request.athlete_id;
        updated.calories_burnt = request.calories_burnt;
        if request.route_id <= 0 {
            updated.event_id = request.event_id;
        } else {
            updated.route_id = request.route_id;
        }

        self.session.stage(Change::Update {
            original: Record::Run(original),
            proposed: Record::Run(updated.clone()),
        });
        commit(&mut self.session).await?;

        log_run_action(updated.run_id, "updated", updated.athlete_id);
        Ok(updated)
    }

    async fn require_athlete(&mut self, athlete_id: i64) -> Result<()> {
        let athletes = self.session.athletes().await?;
        if !athletes.iter().any(|a| a.athlete_id == athlete_id && !a.deleted) {
            return Err(BalekaError::AthleteNotFound { athlete_id });
        }
        Ok(())
    }

    /// Soft delete. Deleting an already deleted run changes nothing.
    pub async fn delete(&mut self, run_id: i64) -> Result<()> {
        let runs = self.session.runs().await?;
        let original = query::run_by_id(&runs, run_id)?
            .ok_or(BalekaError::RunNotFound { run_id })?;

        if original.deleted {
            return Ok(());
        }

        let athlete_id = original.athlete_id;
        let mut deleted = original.clone();
        deleted.deleted = true;
        self.session.stage(Change::Update {
            original: Record::Run(original),
            proposed: Record::Run(deleted),
        });
        commit(&mut self.session).await?;

        log_run_action(run_id, "deleted", athlete_id);
        Ok(())
    }
}

fn validate_new_run(request: &CreateRunRequest) -> Result<()> {
    let is_event = request.event_id > 0;
    let is_route = request.route_id > 0;
    if is_event == is_route {
        return Err(BalekaError::Validation(
            "A run needs exactly one of event or route".to_string(),
        ));
    }

    validate_run_fields(
        request.athlete_id,
        request.start_time,
        request.end_time,
        request.distance,
        request.calories_burnt,
    )
}

/// Checks shared by new and updated runs
fn validate_run_fields(
    athlete_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    distance: f64,
    calories_burnt: f64,
) -> Result<()> {
    if athlete_id <= 0 {
        return Err(BalekaError::Validation("Run owner is required".to_string()));
    }

    if end_time < start_time {
        return Err(BalekaError::Validation("Run cannot end before it starts".to_string()));
    }

    if !is_valid_amount(distance) || !is_valid_amount(calories_burnt) {
        return Err(BalekaError::Validation(
            "Distance and calories must be finite and not negative".to_string(),
        ));
    }

    Ok(())
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
