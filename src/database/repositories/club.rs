//! Club repository implementation
//!
//! Clubs are soft-deleted only. Membership rows are never duplicated: joining
//! again re-activates the existing (club, athlete) row.

use tracing::{debug, info};

use crate::database::conflict::{commit, commit_resolving, ConflictResolver};
use crate::database::session::{Change, EntityKind, Record, Session};
use crate::models::club::{Club, ClubMember, ClubStatus, CreateClubRequest, JoinClubRequest, UpdateClubRequest};
use crate::query;
use crate::utils::errors::{BalekaError, Result};
use crate::utils::helpers::{now, require_text};
use crate::utils::logging::{log_club_event, log_membership_change};

pub struct ClubRepository<S: Session> {
    session: S,
    resolver: ConflictResolver,
}

impl<S: Session> ClubRepository<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            resolver: ConflictResolver::new(),
        }
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Active clubs with their joined members attached
    pub async fn clubs_query(&mut self) -> Result<Vec<Club>> {
        let members = self.club_members_query().await?;
        let clubs = self.session.clubs().await?;
        Ok(query::active_clubs(&clubs, &members))
    }

    /// Joined memberships with athlete profiles attached
    pub async fn club_members_query(&mut self) -> Result<Vec<ClubMember>> {
        let members = self.session.club_members().await?;
        let athletes = self.session.athletes().await?;
        Ok(query::active_members(&members, &athletes))
    }

    pub async fn all(&mut self) -> Result<Vec<Club>> {
        self.clubs_query().await
    }

    pub async fn club_by_id(&mut self, club_id: i64) -> Result<Option<Club>> {
        let clubs = self.clubs_query().await?;
        query::club_by_id(&clubs, club_id)
    }

    pub async fn user_clubs(&mut self, user_id: &str) -> Result<Vec<Club>> {
        let clubs = self.clubs_query().await?;
        Ok(query::clubs_by_user(&clubs, user_id))
    }

    async fn require_club(&mut self, club_id: i64) -> Result<Club> {
        self.club_by_id(club_id)
            .await?
            .ok_or(BalekaError::ClubNotFound { club_id })
    }

    /// Create a club and return it as re-read by (user, name, description, creation time)
    pub async fn create_club(&mut self, request: CreateClubRequest) -> Result<Club> {
        require_text("Club name", &request.name)?;
        require_text("Club owner", &request.user_id)?;

        let club = Club {
            club_id: 0,
            name: request.name,
            description: request.description,
            location: request.location,
            date_created: now(),
            user_id: request.user_id,
            deleted: false,
            members: Vec::new(),
        };

        self.session.stage(Change::Insert(Record::Club(club.clone())));
        let inserted = commit_resolving(&mut self.session, &self.resolver).await?;
        let club_id = inserted
            .iter()
            .find(|(kind, _)| *kind == EntityKind::Club)
            .map(|(_, key)| *key)
            .unwrap_or_default();

        let matches: Vec<Club> = self
            .user_clubs(&club.user_id)
            .await?
            .into_iter()
            .filter(|c| {
                c.name == club.name
                    && c.description == club.description
                    && c.date_created == club.date_created
            })
            .collect();

        let created = query::single_or_none(matches, EntityKind::Club, || {
            format!(
                "user_id = {} AND name = {} AND date_created = {}",
                club.user_id, club.name, club.date_created
            )
        })?
        .ok_or(BalekaError::ClubNotFound { club_id })?;

        log_club_event(created.club_id, "created", Some(&created.user_id));
        Ok(created)
    }

    /// Replace a club's editable fields. The creation stamp is refreshed.
    pub async fn update_club(&mut self, request: UpdateClubRequest) -> Result<Club> {
        require_text("Club name", &request.name)?;
        require_text("Club owner", &request.user_id)?;

        let original = self.require_club(request.club_id).await?;
        let mut updated = original.clone();
        updated.name = request.name;
        updated.description = request.description;
        updated.location = request.location;
        updated.user_id = request.user_id;
        updated.date_created = now();
        updated.deleted = false;

        self.stage_update(original, updated.clone());
        commit(&mut self.session).await?;

        log_club_event(updated.club_id, "updated", Some(&updated.user_id));
        Ok(updated)
    }

    /// Soft delete
    pub async fn delete(&mut self, club_id: i64) -> Result<()> {
        let original = self.require_club(club_id).await?;
        let mut deleted = original.clone();
        deleted.deleted = true;

        self.stage_update(original, deleted);
        commit(&mut self.session).await?;

        log_club_event(club_id, "deleted", None);
        Ok(())
    }

    /// Soft delete through an explicit update; same observable result as [`Self::delete`]
    pub async fn delete_club(&mut self, club_id: i64) -> Result<()> {
        self.delete(club_id).await
    }

    fn stage_update(&mut self, original: Club, mut proposed: Club) {
        proposed.members.clear();
        self.session.stage(Change::Update {
            original: Record::Club(original),
            proposed: Record::Club(proposed),
        });
    }

    pub async fn member_by_id(&mut self, member_id: i64) -> Result<Option<ClubMember>> {
        let members = self.club_members_query().await?;
        query::member_by_id(&members, member_id)
    }

    pub async fn members(&mut self, club_id: i64) -> Result<Vec<ClubMember>> {
        let members = self.club_members_query().await?;
        Ok(query::members_by_club(&members, club_id))
    }

    /// Join a club, re-activating an earlier membership row when one exists
    pub async fn join_club(&mut self, request: JoinClubRequest) -> Result<ClubMember> {
        let JoinClubRequest { club_id, athlete_id } = request;

        self.require_club(club_id).await?;
        let athletes = self.session.athletes().await?;
        if !athletes.iter().any(|a| a.athlete_id == athlete_id && !a.deleted) {
            return Err(BalekaError::AthleteNotFound { athlete_id });
        }

        let rows = self.session.club_members().await?;
        match query::membership_row(&rows, club_id, athlete_id)? {
            Some(existing) => {
                debug!(member_id = existing.member_id, "Re-activating existing membership");
                let mut rejoined = existing.clone();
                rejoined.status = ClubStatus::Joined;
                rejoined.date_joined = now();
                rejoined.date_left = None;
                self.session.stage(Change::Update {
                    original: Record::ClubMember(existing),
                    proposed: Record::ClubMember(rejoined),
                });
            }
            None => {
                let member = ClubMember {
                    member_id: 0,
                    club_id,
                    athlete_id,
                    status: ClubStatus::Joined,
                    date_joined: now(),
                    date_left: None,
                    athlete: None,
                };
                self.session.stage(Change::Insert(Record::ClubMember(member)));
            }
        }

        commit(&mut self.session).await?;
        log_membership_change(club_id, athlete_id, &ClubStatus::Joined.to_string());

        let rows = self.session.club_members().await?;
        query::membership_row(&rows, club_id, athlete_id)?
            .ok_or(BalekaError::MembershipNotFound { club_id, athlete_id })
    }

    /// Leave a club: Joined → Left, stamping the leave date
    pub async fn leave_club(&mut self, member_id: i64) -> Result<ClubMember> {
        let original = self
            .member_by_id(member_id)
            .await?
            .ok_or(BalekaError::MemberNotFound { member_id })?;

        let mut left = original.clone();
        left.status = ClubStatus::Left;
        left.date_left = Some(now());
        left.athlete = None;

        self.session.stage(Change::Update {
            original: Record::ClubMember(original),
            proposed: Record::ClubMember(left.clone()),
        });
        commit(&mut self.session).await?;

        info!(member_id = member_id, "Athlete left club");
        log_membership_change(left.club_id, left.athlete_id, &ClubStatus::Left.to_string());
        Ok(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::session::Store;

    fn request(name: &str) -> CreateClubRequest {
        CreateClubRequest {
            name: name.to_string(),
            description: Some("Sunday long runs".to_string()),
            location: Some("Johannesburg".to_string()),
            user_id: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_club_stamps_and_refetches() {
        let store = MemoryStore::new();
        let mut repo = ClubRepository::new(store.session());

        let club = repo.create_club(request("Road Runners")).await.unwrap();
        assert!(club.club_id > 0);
        assert!(!club.deleted);
        assert_eq!(club.name, "Road Runners");
        assert!(club.members.is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let store = MemoryStore::new();
        let mut repo = ClubRepository::new(store.session());
        assert!(matches!(
            repo.create_club(request("  ")).await,
            Err(BalekaError::Validation(_))
        ));
        assert_eq!(store.count(EntityKind::Club), 0);
    }

    #[tokio::test]
    async fn test_update_missing_club_is_not_found() {
        let store = MemoryStore::new();
        let mut repo = ClubRepository::new(store.session());
        let result = repo
            .update_club(UpdateClubRequest {
                club_id: 42,
                name: "Ghost".to_string(),
                description: None,
                location: None,
                user_id: "u1".to_string(),
            })
            .await;
        assert!(matches!(result, Err(BalekaError::ClubNotFound { club_id: 42 })));
    }
}
