//! Query engine
//!
//! Pure functions over rows already loaded from storage: soft-delete filtering,
//! stitching related rows together and run statistics. Nothing here touches a
//! session, so every rule can be exercised on plain vectors.

pub mod clubs;
pub mod runs;

pub use clubs::{
    active_clubs, active_members, club_by_id, clubs_by_user, member_by_id, members_by_club,
    membership_row,
};
pub use runs::{
    active_runs, event_runs, parse_date_bound, personal_runs, route_run_count, run_by_id,
    runs_by_athlete, runs_by_event, runs_by_route, RunStats,
};

use crate::database::session::EntityKind;
use crate::utils::errors::{BalekaError, Result};

/// Zero or one match. More than one is a data-integrity error, never pick-first.
pub(crate) fn single_or_none<T, I>(matches: I, entity: EntityKind, criteria: impl FnOnce() -> String) -> Result<Option<T>>
where
    I: IntoIterator<Item = T>,
{
    let mut matches = matches.into_iter();
    let first = matches.next();
    let rest = matches.count();

    if rest > 0 {
        return Err(BalekaError::AmbiguousMatch {
            entity,
            criteria: criteria(),
            count: rest + 1,
        });
    }

    Ok(first)
}
