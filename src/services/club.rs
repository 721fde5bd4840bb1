//! Club service implementation

use crate::database::conflict::commit;
use crate::database::repositories::ClubRepository;
use crate::database::session::Session;
use crate::models::club::{Club, ClubMember, CreateClubRequest, JoinClubRequest, UpdateClubRequest};
use crate::utils::errors::Result;

pub struct ClubService<S: Session> {
    club_repository: ClubRepository<S>,
}

impl<S: Session> ClubService<S> {
    pub fn new(club_repository: ClubRepository<S>) -> Self {
        Self { club_repository }
    }

    pub async fn get_clubs(&mut self) -> Result<Vec<Club>> {
        self.club_repository.all().await
    }

    pub async fn get_club_by_id(&mut self, club_id: i64) -> Result<Option<Club>> {
        self.club_repository.club_by_id(club_id).await
    }

    pub async fn get_user_clubs(&mut self, user_id: &str) -> Result<Vec<Club>> {
        self.club_repository.user_clubs(user_id).await
    }

    pub async fn create_club(&mut self, request: CreateClubRequest) -> Result<Club> {
        self.club_repository.create_club(request).await
    }

    pub async fn update_club(&mut self, request: UpdateClubRequest) -> Result<Club> {
        self.club_repository.update_club(request).await
    }

    pub async fn delete_club(&mut self, club_id: i64) -> Result<()> {
        self.club_repository.delete_club(club_id).await
    }

    pub async fn get_member_by_id(&mut self, member_id: i64) -> Result<Option<ClubMember>> {
        self.club_repository.member_by_id(member_id).await
    }

    pub async fn get_members(&mut self, club_id: i64) -> Result<Vec<ClubMember>> {
        self.club_repository.members(club_id).await
    }

    pub async fn join_club(&mut self, request: JoinClubRequest) -> Result<ClubMember> {
        self.club_repository.join_club(request).await
    }

    pub async fn leave_club(&mut self, member_id: i64) -> Result<ClubMember> {
        self.club_repository.leave_club(member_id).await
    }

    pub async fn save(&mut self) -> Result<()> {
        commit(self.club_repository.session_mut()).await?;
        Ok(())
    }
}
