//! Test data helpers for creating rows and requests

use chrono::{DateTime, TimeZone, Utc};

use baleka::database::{EntityKind, MemoryStore, Record};
use baleka::models::{
    Athlete, CreateAthleteRequest, CreateClubRequest, CreateRunRequest, Event, EventRegistration,
    EventStatus, Run,
};
use baleka::utils::helpers::hash_password;

pub const TEST_PASSWORD: &str = "tempo-tuesday";

/// 06:00 UTC on the given day of 2024
pub fn day_2024(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 6, 0, 0).unwrap()
}

pub fn test_athlete(username: &str) -> Athlete {
    Athlete {
        athlete_id: 0,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        first_name: "Test".to_string(),
        surname: username.to_string(),
        date_of_birth: None,
        gender: None,
        license_no: None,
        registration_date: Utc::now(),
        deleted: false,
    }
}

pub fn create_athlete_request(username: &str) -> CreateAthleteRequest {
    CreateAthleteRequest {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: TEST_PASSWORD.to_string(),
        first_name: "Test".to_string(),
        surname: username.to_string(),
        date_of_birth: None,
        gender: Some("F".to_string()),
        license_no: None,
    }
}

pub fn create_club_request(name: &str, user_id: &str) -> CreateClubRequest {
    CreateClubRequest {
        name: name.to_string(),
        description: Some(format!("{} weekly sessions", name)),
        location: Some("Cape Town".to_string()),
        user_id: user_id.to_string(),
    }
}

pub fn test_run(athlete_id: i64, event_id: i64, route_id: i64, start: DateTime<Utc>, distance: f64) -> Run {
    Run {
        run_id: 0,
        athlete_id,
        event_id,
        route_id,
        start_time: start,
        end_time: start + chrono::Duration::minutes(45),
        distance,
        calories_burnt: distance * 60.0,
        deleted: false,
    }
}

pub fn create_run_request(athlete_id: i64, event_id: i64, route_id: i64, distance: f64) -> CreateRunRequest {
    let start = day_2024(3, 10);
    CreateRunRequest {
        athlete_id,
        event_id,
        route_id,
        start_time: start,
        end_time: start + chrono::Duration::minutes(45),
        distance,
        calories_burnt: distance * 60.0,
    }
}

pub fn test_event(title: &str, event_date: DateTime<Utc>) -> Event {
    Event {
        event_id: 0,
        title: title.to_string(),
        description: None,
        event_date,
        location: Some("Green Point".to_string()),
        status: EventStatus::Pending,
        deleted: false,
    }
}

pub fn test_registration(event_id: i64, athlete_id: i64, route_id: i64) -> EventRegistration {
    EventRegistration {
        registration_id: 0,
        event_id,
        athlete_id,
        route_id,
        date_registered: Utc::now(),
        deleted: false,
    }
}

/// A store holding the given athletes; returns the store and their ids in order
pub fn seeded_store(usernames: &[&str]) -> (MemoryStore, Vec<i64>) {
    let store = MemoryStore::new();
    let ids = usernames
        .iter()
        .map(|username| store.insert(Record::Athlete(test_athlete(username))))
        .collect();
    (store, ids)
}

pub fn insert_runs(store: &MemoryStore, runs: Vec<Run>) -> Vec<i64> {
    runs.into_iter().map(|run| store.insert(Record::Run(run))).collect()
}

pub fn stored_run(store: &MemoryStore, run_id: i64) -> Option<Run> {
    match store.row(EntityKind::Run, run_id) {
        Some(Record::Run(run)) => Some(run),
        _ => None,
    }
}
