//! Domain types for the carriage allocator.
//!
//! This module contains the core domain model: trains, their eight
//! carriages, the day's schedule and the groups asking to be seated. All
//! types enforce their invariants at construction time, so code that
//! receives these types can trust their validity.

mod booking;
mod carriage;
mod error;
mod group;
mod schedule;
mod time;
mod train;

pub use booking::{BookedCarriage, Booking};
pub use carriage::{Carriage, CarriageNumber, InvalidCarriageNumber};
pub use error::DomainError;
pub use group::{GroupId, GroupRequest, MAX_WHEELCHAIRS, ValidationError};
pub use schedule::Schedule;
pub use time::{DepartureTime, TimeError};
pub use train::{STANDARD_LAYOUT, Train};
