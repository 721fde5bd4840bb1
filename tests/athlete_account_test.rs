//! Athlete account integration tests

mod helpers;

use assert_matches::assert_matches;

use baleka::database::{AthleteRepository, Store};
use baleka::models::{ChangePasswordRequest, UpdateAthleteRequest};
use baleka::BalekaError;
use helpers::*;

#[tokio::test]
async fn test_register_and_login() {
    let (store, _) = seeded_store(&[]);
    let mut athletes = AthleteRepository::new(store.session());

    let athlete = athletes.add_athlete(create_athlete_request("zanele")).await.unwrap();
    let logged_in = athletes.login_athlete("zanele", TEST_PASSWORD).await.unwrap();
    assert_eq!(logged_in.athlete_id, athlete.athlete_id);

    assert_matches!(
        athletes.login_athlete("zanele", "wrong password").await,
        Err(BalekaError::InvalidCredentials)
    );
    assert_matches!(
        athletes.login_athlete("nobody", TEST_PASSWORD).await,
        Err(BalekaError::InvalidCredentials)
    );
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let (store, ids) = seeded_store(&["zanele"]);
    let mut athletes = AthleteRepository::new(store.session());

    let wrong = ChangePasswordRequest {
        athlete_id: ids[0],
        current_password: "guess".to_string(),
        new_password: "new-and-long".to_string(),
    };
    assert_matches!(athletes.change_password(wrong).await, Err(BalekaError::InvalidCredentials));

    let right = ChangePasswordRequest {
        athlete_id: ids[0],
        current_password: TEST_PASSWORD.to_string(),
        new_password: "new-and-long".to_string(),
    };
    athletes.change_password(right).await.unwrap();

    assert!(athletes.login_athlete("zanele", "new-and-long").await.is_ok());
    assert_matches!(
        athletes.login_athlete("zanele", TEST_PASSWORD).await,
        Err(BalekaError::InvalidCredentials)
    );
}

#[tokio::test]
async fn test_profile_update_keeps_unset_fields() {
    let (store, ids) = seeded_store(&["zanele"]);
    let mut athletes = AthleteRepository::new(store.session());

    let updated = athletes
        .update_athlete(UpdateAthleteRequest {
            athlete_id: ids[0],
            email: None,
            first_name: Some("Zanele".to_string()),
            surname: None,
            date_of_birth: None,
            gender: None,
            license_no: Some("ASA-2291".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Zanele");
    assert_eq!(updated.email, "zanele@example.com");
    assert_eq!(updated.license_no.as_deref(), Some("ASA-2291"));
    assert!(athletes.login_athlete("zanele", TEST_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_deleted_athlete_is_hidden_and_cannot_login() {
    let (store, ids) = seeded_store(&["zanele", "thabo"]);
    let mut athletes = AthleteRepository::new(store.session());

    athletes.delete_athlete(ids[0]).await.unwrap();

    assert!(athletes.athlete_by_id(ids[0]).await.unwrap().is_none());
    assert_eq!(athletes.all().await.unwrap().len(), 1);
    assert_matches!(
        athletes.login_athlete("zanele", TEST_PASSWORD).await,
        Err(BalekaError::InvalidCredentials)
    );
    assert_matches!(
        athletes.delete_athlete(ids[0]).await,
        Err(BalekaError::AthleteNotFound { .. })
    );
}

#[tokio::test]
async fn test_registration_validation() {
    let (store, _) = seeded_store(&["zanele"]);
    let mut athletes = AthleteRepository::new(store.session());

    let mut bad_email = create_athlete_request("thabo");
    bad_email.email = "thabo".to_string();
    assert_matches!(athletes.add_athlete(bad_email).await, Err(BalekaError::Validation(_)));

    assert_matches!(
        athletes.add_athlete(create_athlete_request("zanele")).await,
        Err(BalekaError::Validation(_))
    );
}
