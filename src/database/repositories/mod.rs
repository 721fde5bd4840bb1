//! Database repositories module
//!
//! Repositories own one unit-of-work session each and expose the
//! domain operations over it.

pub mod athlete;
pub mod club;
pub mod event;
pub mod run;

pub use athlete::AthleteRepository;
pub use club::ClubRepository;
pub use event::EventRepository;
pub use run::RunRepository;
