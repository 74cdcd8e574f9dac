//! Allocation error types.

use crate::domain::{DomainError, GroupId, ValidationError};

/// Why a selector could not place a group on one train.
///
/// These are local to a single train; the engine records them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// The group has no adult to supervise it
    #[error("no adult in the group")]
    NoAdults,

    /// No free carriage or run of carriages can seat the group
    #[error("no carriages fit the group")]
    NoFit,

    /// A run fits, but each carriage needs its own supervising adult
    #[error("{carriages} carriages needed but only {adults} adults to supervise")]
    InsufficientSupervision { adults: u32, carriages: usize },
}

/// Errors that abort a whole allocation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    /// The request itself can never be seated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request names a group id that already belongs to another booking
    #[error("group {0} is already booked for a different party")]
    GroupIdInUse(GroupId),

    /// Committing the chosen placement broke a schedule invariant
    #[error("failed to commit booking: {0}")]
    Commit(#[from] DomainError),
}
