//! Run queries and statistics
//!
//! Statistics are computed on a run set that has already been through
//! [`active_runs`], so soft-deleted runs never contribute to a figure.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};

use crate::database::session::EntityKind;
use crate::models::{EventRegistration, Run};
use crate::query::single_or_none;
use crate::utils::errors::{BalekaError, Result};

pub fn active_runs(runs: &[Run]) -> Vec<Run> {
    let mut active: Vec<Run> = runs.iter().filter(|r| !r.deleted).cloned().collect();
    active.sort_by_key(|r| r.run_id);
    active
}

pub fn run_by_id(runs: &[Run], run_id: i64) -> Result<Option<Run>> {
    single_or_none(
        runs.iter().filter(|r| r.run_id == run_id).cloned(),
        EntityKind::Run,
        || format!("run_id = {}", run_id),
    )
}

pub fn runs_by_athlete(runs: &[Run], athlete_id: i64) -> Vec<Run> {
    runs.iter().filter(|r| r.athlete_id == athlete_id).cloned().collect()
}

pub fn runs_by_event(runs: &[Run], event_id: i64) -> Vec<Run> {
    runs.iter().filter(|r| r.event_id == event_id).cloned().collect()
}

pub fn runs_by_route(runs: &[Run], route_id: i64) -> Vec<Run> {
    runs.iter().filter(|r| r.route_id == route_id).cloned().collect()
}

pub fn event_runs(runs: &[Run]) -> Vec<Run> {
    runs.iter().filter(|r| r.is_event_run()).cloned().collect()
}

pub fn personal_runs(runs: &[Run]) -> Vec<Run> {
    runs.iter().filter(|r| r.is_personal_run()).cloned().collect()
}

/// Runs counted against a route: runs tagged with the route, plus event runs
/// whose event has a registration on that route. Each run counts once.
pub fn route_run_count(runs: &[Run], registrations: &[EventRegistration], route_id: i64) -> usize {
    let registered_events: HashSet<i64> = registrations
        .iter()
        .filter(|reg| !reg.deleted && reg.route_id == route_id)
        .map(|reg| reg.event_id)
        .collect();

    runs.iter()
        .filter(|r| {
            r.route_id == route_id || (r.is_event_run() && registered_events.contains(&r.event_id))
        })
        .count()
}

/// Parse an inclusive window bound. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date_bound(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(source) => DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.date_naive())
            .map_err(|_| BalekaError::DateParse {
                input: input.to_string(),
                source,
            }),
    }
}

/// Aggregations over a run set
pub trait RunStats {
    fn total_distance(&self) -> f64;

    fn run_count(&self) -> usize;

    fn event_run_count(&self) -> usize;

    fn personal_run_count(&self) -> usize;

    /// Distance of runs starting on a date in `[start, end]`
    fn distance_over_time(&self, start: &str, end: &str) -> Result<f64>;

    /// Calories of runs starting on a date in `[start, end]`
    fn calories_over_time(&self, start: &str, end: &str) -> Result<f64>;
}

impl RunStats for [Run] {
    fn total_distance(&self) -> f64 {
        self.iter().map(|r| r.distance).sum()
    }

    fn run_count(&self) -> usize {
        self.len()
    }

    fn event_run_count(&self) -> usize {
        self.iter().filter(|r| r.is_event_run()).count()
    }

    fn personal_run_count(&self) -> usize {
        self.iter().filter(|r| r.is_personal_run()).count()
    }

    fn distance_over_time(&self, start: &str, end: &str) -> Result<f64> {
        Ok(within(self, start, end)?.map(|r| r.distance).sum())
    }

    fn calories_over_time(&self, start: &str, end: &str) -> Result<f64> {
        Ok(within(self, start, end)?.map(|r| r.calories_burnt).sum())
    }
}

fn within<'a>(runs: &'a [Run], start: &str, end: &str) -> Result<impl Iterator<Item = &'a Run>> {
    let start = parse_date_bound(start)?;
    let end = parse_date_bound(end)?;

    Ok(runs.iter().filter(move |r| {
        let day = r.start_time.date_naive();
        day >= start && day <= end
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(run_id: i64, event_id: i64, route_id: i64, day: u32, month: u32) -> Run {
        let start = Utc.with_ymd_and_hms(2024, month, day, 6, 30, 0).unwrap();
        Run {
            run_id,
            athlete_id: 1,
            event_id,
            route_id,
            start_time: start,
            end_time: start + chrono::Duration::minutes(45),
            distance: 10.0,
            calories_burnt: 600.0,
            deleted: false,
        }
    }

    fn registration(event_id: i64, route_id: i64) -> EventRegistration {
        EventRegistration {
            registration_id: event_id * 100 + route_id,
            event_id,
            athlete_id: 1,
            route_id,
            date_registered: Utc::now(),
            deleted: false,
        }
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let runs = vec![run(1, 0, 2, 1, 1), run(2, 0, 2, 31, 1), run(3, 0, 2, 1, 2)];
        assert_eq!(runs.distance_over_time("2024-01-01", "2024-01-31").unwrap(), 20.0);
        assert_eq!(runs.calories_over_time("2024-01-01", "2024-01-31").unwrap(), 1200.0);
    }

    #[test]
    fn test_malformed_dates_fail() {
        let runs = vec![run(1, 0, 2, 1, 1)];
        assert!(matches!(
            runs.distance_over_time("01/01/2024", "2024-01-31"),
            Err(BalekaError::DateParse { .. })
        ));
        assert!(matches!(
            runs.calories_over_time("2024-01-01", "not a date"),
            Err(BalekaError::DateParse { .. })
        ));
    }

    #[test]
    fn test_rfc3339_bound_uses_its_date() {
        assert_eq!(
            parse_date_bound("2024-03-05T23:59:59+00:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_categories_are_exclusive() {
        let runs = vec![run(1, 7, 0, 1, 1), run(2, 0, 5, 2, 1), run(3, 0, 5, 3, 1)];
        assert_eq!(runs.event_run_count(), 1);
        assert_eq!(runs.personal_run_count(), 2);
        assert_eq!(runs.run_count(), 3);
        assert_eq!(runs.total_distance(), 30.0);
        assert_eq!(event_runs(&runs).len(), 1);
        assert_eq!(personal_runs(&runs).len(), 2);
    }

    #[test]
    fn test_route_run_count_includes_registered_event_runs() {
        let runs = vec![
            run(1, 0, 5, 1, 1),
            run(2, 7, 0, 2, 1),
            run(3, 8, 0, 3, 1),
            run(4, 0, 6, 4, 1),
        ];
        let registrations = vec![registration(7, 5), registration(7, 5), registration(8, 6)];
        assert_eq!(route_run_count(&runs, &registrations, 5), 2);
        assert_eq!(route_run_count(&runs, &registrations, 6), 2);
        assert_eq!(route_run_count(&runs, &registrations, 9), 0);
    }

    #[test]
    fn test_active_runs_drop_deleted() {
        let mut deleted = run(2, 0, 5, 2, 1);
        deleted.deleted = true;
        let active = active_runs(&[run(3, 0, 5, 1, 1), deleted, run(1, 7, 0, 1, 1)]);
        let ids: Vec<i64> = active.iter().map(|r| r.run_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(run_by_id(&active, 2).unwrap().is_none());
    }
}
