//! Athlete model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Athlete {
    pub athlete_id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub surname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub license_no: Option<String>,
    pub registration_date: DateTime<Utc>,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAthleteRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub surname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub license_no: Option<String>,
}

/// Profile fields only; credentials change through [`ChangePasswordRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAthleteRequest {
    pub athlete_id: i64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub license_no: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub athlete_id: i64,
    pub current_password: String,
    pub new_password: String,
}
