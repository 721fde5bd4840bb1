//! Event activation and service-layer integration tests

mod helpers;

use chrono::Duration;

use baleka::config::Settings;
use baleka::database::{DatabaseService, Record};
use baleka::models::{EventStatus, JoinClubRequest};
use baleka::utils::helpers::now;
use baleka::ServiceFactory;
use helpers::*;

#[tokio::test]
async fn test_process_events_is_idempotent() {
    let (store, athletes) = seeded_store(&["ayanda"]);
    let at = now();
    let due = store.insert(Record::Event(test_event("Night Run", at - Duration::minutes(5))));
    let on_time = store.insert(Record::Event(test_event("Sunrise 10k", at)));
    let later = store.insert(Record::Event(test_event("Comrades", at + Duration::days(60))));
    store.insert(Record::EventRegistration(test_registration(due, athletes[0], 5)));

    let mut services = ServiceFactory::new(&store, &Settings::default());
    assert_eq!(services.event_service.process_events(at).await.unwrap(), 2);
    assert_eq!(services.event_service.process_events(at).await.unwrap(), 0);

    for (event_id, status) in [(due, EventStatus::Active), (on_time, EventStatus::Active), (later, EventStatus::Pending)] {
        let event = services.event_service.get_event_by_id(event_id).await.unwrap().unwrap();
        assert_eq!(event.status, status);
    }

    let registrations = services.event_service.get_registrations_by_route(5).await.unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].event_id, due);
}

#[tokio::test]
async fn test_events_listed_in_date_order() {
    let (store, _) = seeded_store(&[]);
    let at = now();
    store.insert(Record::Event(test_event("Later", at + Duration::days(2))));
    store.insert(Record::Event(test_event("Sooner", at + Duration::days(1))));

    let mut db = DatabaseService::new(store.clone());
    let titles: Vec<String> = db.events.events().await.unwrap().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["Sooner".to_string(), "Later".to_string()]);
}

#[tokio::test]
async fn test_dashboard_reflects_clubs_and_runs() {
    let (store, _) = seeded_store(&[]);
    let mut services = ServiceFactory::new(&store, &Settings::default());

    let athlete = services.athlete_service.add_athlete(create_athlete_request("ayanda")).await.unwrap();
    let club = services
        .club_service
        .create_club(create_club_request("Ayanda's Pacers", &athlete.username))
        .await
        .unwrap();
    services
        .club_service
        .join_club(JoinClubRequest { club_id: club.club_id, athlete_id: athlete.athlete_id })
        .await
        .unwrap();
    services
        .run_service
        .add_run(create_run_request(athlete.athlete_id, 0, 5, 10.0))
        .await
        .unwrap();
    services
        .run_service
        .add_run(create_run_request(athlete.athlete_id, 4, 0, 21.1))
        .await
        .unwrap();
    services.save_all().await.unwrap();

    let mut db = DatabaseService::new(store.clone());
    let dashboard = db.athlete_dashboard(athlete.athlete_id).await.unwrap();
    assert_eq!(dashboard["stats"]["run_count"], 2);
    assert_eq!(dashboard["stats"]["event_run_count"], 1);
    assert_eq!(dashboard["stats"]["personal_run_count"], 1);
    assert_eq!(dashboard["clubs"][0]["members"].as_array().map(Vec::len), Some(1));
}
