//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from allocation outcomes.

use super::{CarriageNumber, DepartureTime};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A carriage with no seats
    #[error("carriage {0} must have at least one seat")]
    ZeroCapacity(CarriageNumber),

    /// A train whose carriages are not exactly 1-8 in order
    #[error("invalid carriage layout: {0}")]
    CarriageLayout(&'static str),

    /// Seats and group id disagree about occupancy
    #[error("carriage {0} has seats without a group or a group without seats")]
    GroupMismatch(CarriageNumber),

    /// Two trains at the same time
    #[error("a train already departs at {0}")]
    DuplicateDeparture(DepartureTime),

    /// No train at the given time
    #[error("no train departs at {0}")]
    UnknownTrain(DepartureTime),

    /// Attempt to seat a group in a claimed carriage
    #[error("carriage {0} is already occupied")]
    CarriageOccupied(CarriageNumber),

    /// Wheelchair placed outside the accessible carriage
    #[error("carriage {0} is not wheelchair accessible")]
    NotWheelchairAccessible(CarriageNumber),

    /// Seat count outside 1..=capacity
    #[error("carriage {number} cannot seat {seats} (capacity {capacity})")]
    OverCapacity {
        number: CarriageNumber,
        seats: u32,
        capacity: u32,
    },

    /// More toddlers than seated people
    #[error("carriage {number} cannot hold {toddlers} toddlers for {seats} seats")]
    ToddlersExceedSeats {
        number: CarriageNumber,
        toddlers: u32,
        seats: u32,
    },
}
