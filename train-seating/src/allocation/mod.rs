//! Seating groups on trains.
//!
//! Selectors look at one train and propose a [`Placement`] without touching
//! it. The [`Allocator`] walks the day's trains in departure order, stops
//! for operator confirmation where a placement needs approval, and commits
//! the first placement that works.

mod availability;
mod best_fit;
mod config;
mod eligibility;
mod engine;
mod error;
mod placement;
mod protocol;
mod restricted;
mod single;
mod wheelchair;

pub use availability::{
    CarriagePair, only_c1_c8_available, only_c4_c5_available, only_pair_available,
    sole_pair_option,
};
pub use best_fit::select_best_fit;
pub use config::AllocationConfig;
pub use eligibility::{Eligibility, classify, is_assignable, minutes_until_departure};
pub use engine::{Allocator, Outcome, Rejection, group_can_fit};
pub use error::{AllocationError, SelectError};
pub use placement::{Placement, Seat};
pub use protocol::{
    AttemptState, BookingAttempt, ConfirmationReason, Decision, Decisions, OversizedChoice,
    PendingConfirmation, ProtocolError, TWO_SEAT_FALLBACK, apply_decision,
};
pub use restricted::select_restricted;
pub use single::{Selection, SizeClass, select_medium, select_small};
pub use wheelchair::{
    WheelchairChoice, can_fit_wheelchair, free_wheelchair_carriages, select_wheelchair,
};
