//! Run model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A logged run. `event_id` and `route_id` use 0 for "unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Run {
    pub run_id: i64,
    pub athlete_id: i64,
    pub event_id: i64,
    pub route_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance: f64,
    pub calories_burnt: f64,
    pub deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCategory {
    /// Run as part of an event (`event_id != 0`)
    Event,
    /// Personal run along a route (`route_id != 0`)
    Personal,
}

impl Run {
    pub fn is_event_run(&self) -> bool {
        self.event_id != 0
    }

    pub fn is_personal_run(&self) -> bool {
        self.route_id != 0
    }

    pub fn category(&self) -> Option<RunCategory> {
        if self.is_event_run() {
            Some(RunCategory::Event)
        } else if self.is_personal_run() {
            Some(RunCategory::Personal)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunRequest {
    pub athlete_id: i64,
    #[serde(default)]
    pub event_id: i64,
    #[serde(default)]
    pub route_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance: f64,
    pub calories_burnt: f64,
}

/// Replacement values for an existing run.
///
/// Only one of `event_id`/`route_id` is applied per update: `event_id` when
/// `route_id <= 0`, otherwise `route_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRunRequest {
    pub run_id: i64,
    pub athlete_id: i64,
    #[serde(default)]
    pub event_id: i64,
    #[serde(default)]
    pub route_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance: f64,
    pub calories_burnt: f64,
}
