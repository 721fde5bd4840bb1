//! Club and membership queries

use crate::database::session::EntityKind;
use crate::models::{Athlete, Club, ClubMember};
use crate::query::single_or_none;
use crate::utils::errors::Result;

/// Joined memberships ordered by member id, each carrying its athlete profile
/// when that athlete is not deleted.
pub fn active_members(members: &[ClubMember], athletes: &[Athlete]) -> Vec<ClubMember> {
    let mut active: Vec<ClubMember> = members
        .iter()
        .filter(|m| m.is_joined())
        .cloned()
        .map(|mut member| {
            member.athlete = athletes
                .iter()
                .find(|a| a.athlete_id == member.athlete_id && !a.deleted)
                .cloned();
            member
        })
        .collect();

    active.sort_by_key(|m| m.member_id);
    active
}

/// Non-deleted clubs ordered by club id, with their joined members attached.
///
/// `members` is expected to be the output of [`active_members`].
pub fn active_clubs(clubs: &[Club], members: &[ClubMember]) -> Vec<Club> {
    let mut active: Vec<Club> = clubs
        .iter()
        .filter(|c| !c.deleted)
        .cloned()
        .map(|mut club| {
            club.members = members_by_club(members, club.club_id);
            club
        })
        .collect();

    active.sort_by_key(|c| c.club_id);
    active
}

pub fn club_by_id(clubs: &[Club], club_id: i64) -> Result<Option<Club>> {
    single_or_none(
        clubs.iter().filter(|c| c.club_id == club_id).cloned(),
        EntityKind::Club,
        || format!("club_id = {}", club_id),
    )
}

pub fn clubs_by_user(clubs: &[Club], user_id: &str) -> Vec<Club> {
    clubs.iter().filter(|c| c.user_id == user_id).cloned().collect()
}

pub fn member_by_id(members: &[ClubMember], member_id: i64) -> Result<Option<ClubMember>> {
    single_or_none(
        members.iter().filter(|m| m.member_id == member_id).cloned(),
        EntityKind::ClubMember,
        || format!("member_id = {}", member_id),
    )
}

pub fn members_by_club(members: &[ClubMember], club_id: i64) -> Vec<ClubMember> {
    members.iter().filter(|m| m.club_id == club_id).cloned().collect()
}

/// The membership row for a (club, athlete) pair in any status.
pub fn membership_row(members: &[ClubMember], club_id: i64, athlete_id: i64) -> Result<Option<ClubMember>> {
    single_or_none(
        members
            .iter()
            .filter(|m| m.club_id == club_id && m.athlete_id == athlete_id)
            .cloned(),
        EntityKind::ClubMember,
        || format!("club_id = {} AND athlete_id = {}", club_id, athlete_id),
    )
}
