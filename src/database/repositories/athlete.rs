//! Athlete repository implementation

use crate::database::conflict::commit;
use crate::database::session::{Change, EntityKind, Record, Session};
use crate::models::athlete::{Athlete, ChangePasswordRequest, CreateAthleteRequest, UpdateAthleteRequest};
use crate::query::single_or_none;
use crate::utils::errors::{BalekaError, Result};
use crate::utils::helpers::{hash_password, is_valid_email, now, require_text, verify_password};
use crate::utils::logging::log_athlete_action;

pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

pub struct AthleteRepository<S: Session> {
    session: S,
    min_password_length: usize,
}

impl<S: Session> AthleteRepository<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    pub fn with_min_password_length(mut self, min_password_length: usize) -> Self {
        self.min_password_length = min_password_length;
        self
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Non-deleted athletes ordered by id
    pub async fn athletes_query(&mut self) -> Result<Vec<Athlete>> {
        let mut athletes: Vec<Athlete> = self
            .session
            .athletes()
            .await?
            .into_iter()
            .filter(|a| !a.deleted)
            .collect();
        athletes.sort_by_key(|a| a.athlete_id);
        Ok(athletes)
    }

    pub async fn all(&mut self) -> Result<Vec<Athlete>> {
        self.athletes_query().await
    }

    pub async fn athlete_by_id(&mut self, athlete_id: i64) -> Result<Option<Athlete>> {
        let athletes = self.athletes_query().await?;
        single_or_none(
            athletes.into_iter().filter(|a| a.athlete_id == athlete_id),
            EntityKind::Athlete,
            || format!("athlete_id = {}", athlete_id),
        )
    }

    async fn require_athlete(&mut self, athlete_id: i64) -> Result<Athlete> {
        self.athlete_by_id(athlete_id)
            .await?
            .ok_or(BalekaError::AthleteNotFound { athlete_id })
    }

    pub async fn add_athlete(&mut self, request: CreateAthleteRequest) -> Result<Athlete> {
        require_text("Username", &request.username)?;
        require_text("First name", &request.first_name)?;
        require_text("Surname", &request.surname)?;
        if !is_valid_email(&request.email) {
            return Err(BalekaError::Validation(format!("Invalid email: {}", request.email)));
        }
        self.check_password_policy(&request.password)?;

        let taken = self
            .session
            .athletes()
            .await?
            .iter()
            .any(|a| a.username.eq_ignore_ascii_case(&request.username));
        if taken {
            return Err(BalekaError::Validation(format!(
                "Username '{}' is already registered",
                request.username
            )));
        }

        let athlete = Athlete {
            athlete_id: 0,
            username: request.username,
            email: request.email,
            password_hash: hash_password(&request.password)?,
            first_name: request.first_name,
            surname: request.surname,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            license_no: request.license_no,
            registration_date: now(),
            deleted: false,
        };

        self.session.stage(Change::Insert(Record::Athlete(athlete.clone())));
        let inserted = commit(&mut self.session).await?;
        let athlete_id = inserted
            .into_iter()
            .find(|(kind, _)| *kind == EntityKind::Athlete)
            .map(|(_, key)| key)
            .unwrap_or_default();

        log_athlete_action(athlete_id, "registered");
        Ok(Athlete { athlete_id, ..athlete })
    }

    /// Update profile fields; `None` keeps the stored value
    pub async fn update_athlete(&mut self, request: UpdateAthleteRequest) -> Result<Athlete> {
        let original = self.require_athlete(request.athlete_id).await?;
        let mut updated = original.clone();

        if let Some(email) = request.email {
            if !is_valid_email(&email) {
                return Err(BalekaError::Validation(format!("Invalid email: {}", email)));
            }
            updated.email = email;
        }
        if let Some(first_name) = request.first_name {
            require_text("First name", &first_name)?;
            updated.first_name = first_name;
        }
        if let Some(surname) = request.surname {
            require_text("Surname", &surname)?;
            updated.surname = surname;
        }
        if request.date_of_birth.is_some() {
            updated.date_of_birth = request.date_of_birth;
        }
        if request.gender.is_some() {
            updated.gender = request.gender;
        }
        if request.license_no.is_some() {
            updated.license_no = request.license_no;
        }

        self.stage_update(original, updated.clone());
        commit(&mut self.session).await?;

        log_athlete_action(updated.athlete_id, "updated");
        Ok(updated)
    }

    pub async fn change_password(&mut self, request: ChangePasswordRequest) -> Result<Athlete> {
        let original = self.require_athlete(request.athlete_id).await?;
        if !verify_password(&request.current_password, &original.password_hash) {
            return Err(BalekaError::InvalidCredentials);
        }
        self.check_password_policy(&request.new_password)?;

        let mut updated = original.clone();
        updated.password_hash = hash_password(&request.new_password)?;

        self.stage_update(original, updated.clone());
        commit(&mut self.session).await?;

        log_athlete_action(updated.athlete_id, "password_changed");
        Ok(updated)
    }

    /// Password check. Unknown usernames and wrong passwords are indistinguishable.
    pub async fn login_athlete(&mut self, username: &str, password: &str) -> Result<Athlete> {
        let athletes = self.athletes_query().await?;
        let athlete = single_or_none(
            athletes.into_iter().filter(|a| a.username.eq_ignore_ascii_case(username)),
            EntityKind::Athlete,
            || format!("username = {}", username),
        )?
        .ok_or(BalekaError::InvalidCredentials)?;

        if !verify_password(password, &athlete.password_hash) {
            tracing::warn!(athlete_id = athlete.athlete_id, "Failed login attempt");
            return Err(BalekaError::InvalidCredentials);
        }

        log_athlete_action(athlete.athlete_id, "logged_in");
        Ok(athlete)
    }

    /// Soft delete
    pub async fn delete_athlete(&mut self, athlete_id: i64) -> Result<()> {
        let original = self.require_athlete(athlete_id).await?;
        let mut deleted = original.clone();
        deleted.deleted = true;

        self.stage_update(original, deleted);
        commit(&mut self.session).await?;

        log_athlete_action(athlete_id, "deleted");
        Ok(())
    }

    fn stage_update(&mut self, original: Athlete, proposed: Athlete) {
        self.session.stage(Change::Update {
            original: Record::Athlete(original),
            proposed: Record::Athlete(proposed),
        });
    }

    fn check_password_policy(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_password_length {
            return Err(BalekaError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }
}
