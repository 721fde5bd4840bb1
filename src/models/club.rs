//! Club and club membership models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::athlete::Athlete;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Club {
    pub club_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_created: DateTime<Utc>,
    pub user_id: String,
    pub deleted: bool,
    /// Joined members, attached by the query layer. Never persisted.
    #[sqlx(skip)]
    #[serde(default)]
    pub members: Vec<ClubMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "club_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClubStatus {
    Joined,
    Left,
}

impl std::fmt::Display for ClubStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClubStatus::Joined => write!(f, "joined"),
            ClubStatus::Left => write!(f, "left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClubMember {
    pub member_id: i64,
    pub club_id: i64,
    pub athlete_id: i64,
    pub status: ClubStatus,
    pub date_joined: DateTime<Utc>,
    pub date_left: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    #[serde(default)]
    pub athlete: Option<Athlete>,
}

impl ClubMember {
    pub fn is_joined(&self) -> bool {
        self.status == ClubStatus::Joined
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub user_id: String,
}

/// Full replacement of a club's editable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClubRequest {
    pub club_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JoinClubRequest {
    pub club_id: i64,
    pub athlete_id: i64,
}
