//! Data models module
//!
//! This module contains the persisted entity shapes and the request types the
//! repositories accept.

pub mod athlete;
pub mod club;
pub mod event;
pub mod run;

// Re-export commonly used models
pub use athlete::{Athlete, ChangePasswordRequest, CreateAthleteRequest, UpdateAthleteRequest};
pub use club::{Club, ClubMember, ClubStatus, CreateClubRequest, JoinClubRequest, UpdateClubRequest};
pub use event::{Event, EventRegistration, EventStatus};
pub use run::{CreateRunRequest, Run, RunCategory, UpdateRunRequest};
