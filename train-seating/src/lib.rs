//! Group seating for a sightseeing train.
//!
//! Places walk-up parties into the carriages of the day's departures,
//! keeping each group together, each carriage supervised, and wheelchair
//! users in the accessible carriage.

pub mod allocation;
pub mod domain;
pub mod store;
pub mod web;
