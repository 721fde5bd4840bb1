//! PostgreSQL store
//!
//! Reads are flat `SELECT`s mapped with `FromRow`. A commit runs in one
//! transaction: every non-forced update first re-reads its row `FOR UPDATE` and
//! is compared with the row the session loaded; any difference aborts the
//! transaction and is reported as a conflict.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::database::session::{
    Change, CommitOutcome, ConflictEntry, EntityKind, Record, Session, Store,
};
use crate::models::{Athlete, Club, ClubMember, Event, EventRegistration, Run};
use crate::utils::errors::Result;
use crate::utils::logging::log_database_operation;

const ATHLETE_COLUMNS: &str = "athlete_id, username, email, password_hash, first_name, surname, date_of_birth, gender, license_no, registration_date, deleted";
const CLUB_COLUMNS: &str = "club_id, name, description, location, date_created, user_id, deleted";
const MEMBER_COLUMNS: &str = "member_id, club_id, athlete_id, status, date_joined, date_left";
const RUN_COLUMNS: &str = "run_id, athlete_id, event_id, route_id, start_time, end_time, distance, calories_burnt, deleted";
const EVENT_COLUMNS: &str = "event_id, title, description, event_date, location, status, deleted";
const REGISTRATION_COLUMNS: &str = "registration_id, event_id, athlete_id, route_id, date_registered, deleted";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    type Session = PgSession;

    fn session(&self) -> PgSession {
        PgSession {
            pool: self.pool.clone(),
            staged: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Staged {
    change: Change,
    force: bool,
}

/// Unit of work over a connection pool
pub struct PgSession {
    pool: PgPool,
    staged: Vec<Staged>,
}

impl PgSession {
    async fn select_all<T>(&self, table: &str, columns: &str, key: &str) -> Result<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let started = std::time::Instant::now();
        let rows = sqlx::query_as::<_, T>(&format!(
            "SELECT {} FROM {} ORDER BY {} ASC",
            columns, table, key
        ))
        .fetch_all(&self.pool)
        .await?;

        log_database_operation("select", table, started.elapsed().as_millis() as u64, true);
        Ok(rows)
    }

    /// One transaction over everything staged. Staged changes survive a conflict
    /// so they can be reconciled and retried.
    async fn apply_staged(&mut self) -> Result<CommitOutcome> {
        let started = std::time::Instant::now();
        let mut tx = self.pool.begin().await?;

        let mut conflicts = Vec::new();
        for staged in &self.staged {
            if staged.force {
                continue;
            }
            if let Change::Update { original, proposed } = &staged.change {
                if let Some(stored) = lock_row(&mut tx, proposed.kind(), proposed.key()).await? {
                    if let Some(entry) = ConflictEntry::diff(original, &stored, proposed)? {
                        conflicts.push(entry);
                    }
                }
            }
        }

        if !conflicts.is_empty() {
            tx.rollback().await?;
            debug!(conflicts = conflicts.len(), "Commit rejected with conflicts");
            return Ok(CommitOutcome::Conflict(conflicts));
        }

        let mut inserted = Vec::new();
        for staged in &self.staged {
            match &staged.change {
                Change::Insert(record) => {
                    let key = insert_record(&mut tx, record).await?;
                    inserted.push((record.kind(), key));
                }
                Change::Update { proposed, .. } => update_record(&mut tx, proposed).await?,
            }
        }

        tx.commit().await?;
        self.staged.clear();

        log_database_operation("commit", "*", started.elapsed().as_millis() as u64, true);
        Ok(CommitOutcome::Committed { inserted })
    }
}

#[async_trait]
impl Session for PgSession {
    async fn athletes(&mut self) -> Result<Vec<Athlete>> {
        self.select_all("athletes", ATHLETE_COLUMNS, "athlete_id").await
    }

    async fn clubs(&mut self) -> Result<Vec<Club>> {
        self.select_all("clubs", CLUB_COLUMNS, "club_id").await
    }

    async fn club_members(&mut self) -> Result<Vec<ClubMember>> {
        self.select_all("club_members", MEMBER_COLUMNS, "member_id").await
    }

    async fn runs(&mut self) -> Result<Vec<Run>> {
        self.select_all("runs", RUN_COLUMNS, "run_id").await
    }

    async fn events(&mut self) -> Result<Vec<Event>> {
        self.select_all("events", EVENT_COLUMNS, "event_id").await
    }

    async fn event_registrations(&mut self) -> Result<Vec<EventRegistration>> {
        self.select_all("event_registrations", REGISTRATION_COLUMNS, "registration_id").await
    }

    fn stage(&mut self, change: Change) {
        self.staged.push(Staged { change, force: false });
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    async fn commit(&mut self) -> Result<CommitOutcome> {
        let outcome = self.apply_staged().await;
        if outcome.is_err() {
            self.staged.clear();
        }
        outcome
    }

    fn accept_proposed(&mut self, entries: &[ConflictEntry]) {
        for staged in &mut self.staged {
            let kind = staged.change.kind();
            let key = staged.change.key();
            if entries.iter().any(|e| e.kind == kind && e.key == key && e.is_settled()) {
                staged.force = true;
            }
        }
    }

    fn discard(&mut self) {
        self.staged.clear();
    }
}

async fn lock_row(conn: &mut PgConnection, kind: EntityKind, key: i64) -> Result<Option<Record>> {
    let record = match kind {
        EntityKind::Athlete => sqlx::query_as::<_, Athlete>(&format!(
            "SELECT {} FROM athletes WHERE athlete_id = $1 FOR UPDATE",
            ATHLETE_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?
        .map(Record::Athlete),
        EntityKind::Club => sqlx::query_as::<_, Club>(&format!(
            "SELECT {} FROM clubs WHERE club_id = $1 FOR UPDATE",
            CLUB_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?
        .map(Record::Club),
        EntityKind::ClubMember => sqlx::query_as::<_, ClubMember>(&format!(
            "SELECT {} FROM club_members WHERE member_id = $1 FOR UPDATE",
            MEMBER_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?
        .map(Record::ClubMember),
        EntityKind::Run => sqlx::query_as::<_, Run>(&format!(
            "SELECT {} FROM runs WHERE run_id = $1 FOR UPDATE",
            RUN_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?
        .map(Record::Run),
        EntityKind::Event => sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE event_id = $1 FOR UPDATE",
            EVENT_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?
        .map(Record::Event),
        EntityKind::EventRegistration => sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {} FROM event_registrations WHERE registration_id = $1 FOR UPDATE",
            REGISTRATION_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?
        .map(Record::EventRegistration),
    };

    Ok(record)
}

async fn insert_record(conn: &mut PgConnection, record: &Record) -> Result<i64> {
    let (key,): (i64,) = match record {
        Record::Athlete(a) => {
            sqlx::query_as(
                r#"
                INSERT INTO athletes (username, email, password_hash, first_name, surname, date_of_birth, gender, license_no, registration_date, deleted)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING athlete_id
                "#,
            )
            .bind(&a.username)
            .bind(&a.email)
            .bind(&a.password_hash)
            .bind(&a.first_name)
            .bind(&a.surname)
            .bind(a.date_of_birth)
            .bind(&a.gender)
            .bind(&a.license_no)
            .bind(a.registration_date)
            .bind(a.deleted)
            .fetch_one(&mut *conn)
            .await?
        }
        Record::Club(c) => {
            sqlx::query_as(
                r#"
                INSERT INTO clubs (name, description, location, date_created, user_id, deleted)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING club_id
                "#,
            )
            .bind(&c.name)
            .bind(&c.description)
            .bind(&c.location)
            .bind(c.date_created)
            .bind(&c.user_id)
            .bind(c.deleted)
            .fetch_one(&mut *conn)
            .await?
        }
        Record::ClubMember(m) => {
            sqlx::query_as(
                r#"
                INSERT INTO club_members (club_id, athlete_id, status, date_joined, date_left)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING member_id
                "#,
            )
            .bind(m.club_id)
            .bind(m.athlete_id)
            .bind(m.status)
            .bind(m.date_joined)
            .bind(m.date_left)
            .fetch_one(&mut *conn)
            .await?
        }
        Record::Run(r) => {
            sqlx::query_as(
                r#"
                INSERT INTO runs (athlete_id, event_id, route_id, start_time, end_time, distance, calories_burnt, deleted)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING run_id
                "#,
            )
            .bind(r.athlete_id)
            .bind(r.event_id)
            .bind(r.route_id)
            .bind(r.start_time)
            .bind(r.end_time)
            .bind(r.distance)
            .bind(r.calories_burnt)
            .bind(r.deleted)
            .fetch_one(&mut *conn)
            .await?
        }
        Record::Event(e) => {
            sqlx::query_as(
                r#"
                INSERT INTO events (title, description, event_date, location, status, deleted)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING event_id
                "#,
            )
            .bind(&e.title)
            .bind(&e.description)
            .bind(e.event_date)
            .bind(&e.location)
            .bind(e.status)
            .bind(e.deleted)
            .fetch_one(&mut *conn)
            .await?
        }
        Record::EventRegistration(r) => {
            sqlx::query_as(
                r#"
                INSERT INTO event_registrations (event_id, athlete_id, route_id, date_registered, deleted)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING registration_id
                "#,
            )
            .bind(r.event_id)
            .bind(r.athlete_id)
            .bind(r.route_id)
            .bind(r.date_registered)
            .bind(r.deleted)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    Ok(key)
}

async fn update_record(conn: &mut PgConnection, record: &Record) -> Result<()> {
    match record {
        Record::Athlete(a) => {
            sqlx::query(
                r#"
                UPDATE athletes
                SET username = $2, email = $3, password_hash = $4, first_name = $5, surname = $6,
                    date_of_birth = $7, gender = $8, license_no = $9, deleted = $10
                WHERE athlete_id = $1
                "#,
            )
            .bind(a.athlete_id)
            .bind(&a.username)
            .bind(&a.email)
            .bind(&a.password_hash)
            .bind(&a.first_name)
            .bind(&a.surname)
            .bind(a.date_of_birth)
            .bind(&a.gender)
            .bind(&a.license_no)
            .bind(a.deleted)
            .execute(&mut *conn)
            .await?;
        }
        Record::Club(c) => {
            sqlx::query(
                r#"
                UPDATE clubs
                SET name = $2, description = $3, location = $4, date_created = $5, user_id = $6, deleted = $7
                WHERE club_id = $1
                "#,
            )
            .bind(c.club_id)
            .bind(&c.name)
            .bind(&c.description)
            .bind(&c.location)
            .bind(c.date_created)
            .bind(&c.user_id)
            .bind(c.deleted)
            .execute(&mut *conn)
            .await?;
        }
        Record::ClubMember(m) => {
            sqlx::query(
                r#"
                UPDATE club_members
                SET club_id = $2, athlete_id = $3, status = $4, date_joined = $5, date_left = $6
                WHERE member_id = $1
                "#,
            )
            .bind(m.member_id)
            .bind(m.club_id)
            .bind(m.athlete_id)
            .bind(m.status)
            .bind(m.date_joined)
            .bind(m.date_left)
            .execute(&mut *conn)
            .await?;
        }
        Record::Run(r) => {
            sqlx::query(
                r#"
                UPDATE runs
                SET athlete_id = $2, event_id = $3, route_id = $4, start_time = $5, end_time = $6,
                    distance = $7, calories_burnt = $8, deleted = $9
                WHERE run_id = $1
                "#,
            )
            .bind(r.run_id)
            .bind(r.athlete_id)
            .bind(r.event_id)
            .bind(r.route_id)
            .bind(r.start_time)
            .bind(r.end_time)
            .bind(r.distance)
            .bind(r.calories_burnt)
            .bind(r.deleted)
            .execute(&mut *conn)
            .await?;
        }
        Record::Event(e) => {
            sqlx::query(
                r#"
                UPDATE events
                SET title = $2, description = $3, event_date = $4, location = $5, status = $6, deleted = $7
                WHERE event_id = $1
                "#,
            )
            .bind(e.event_id)
            .bind(&e.title)
            .bind(&e.description)
            .bind(e.event_date)
            .bind(&e.location)
            .bind(e.status)
            .bind(e.deleted)
            .execute(&mut *conn)
            .await?;
        }
        Record::EventRegistration(r) => {
            sqlx::query(
                r#"
                UPDATE event_registrations
                SET event_id = $2, athlete_id = $3, route_id = $4, date_registered = $5, deleted = $6
                WHERE registration_id = $1
                "#,
            )
            .bind(r.registration_id)
            .bind(r.event_id)
            .bind(r.athlete_id)
            .bind(r.route_id)
            .bind(r.date_registered)
            .bind(r.deleted)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pg_session_stages_without_connecting() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/baleka_test");
        if let Ok(pool) = pool {
            let store = PgStore::new(pool);
            let mut session = store.session();
            assert_eq!(session.pending(), 0);
            session.discard();
            assert_eq!(session.pending(), 0);
        }
    }
}
