//! Visitor groups and their booking identifiers.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::carriage::CarriageNumber;

/// Identifier shared by every carriage a booking occupies.
///
/// Identifiers are handed out as one more than the largest in the schedule,
/// so they increase monotonically and are never reused while the schedule lives.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GroupId(NonZeroU32);

impl GroupId {
    /// The first identifier handed out on an empty schedule.
    pub const FIRST: GroupId = GroupId(NonZeroU32::MIN);

    /// Returns `None` for 0, which stored schedules use to mean "free".
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(GroupId)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The identifier after this one.
    pub fn next(self) -> Self {
        GroupId(self.0.saturating_add(1))
    }
}

impl TryFrom<u32> for GroupId {
    type Error = &'static str;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        GroupId::new(id).ok_or("group id must be non-zero")
    }
}

impl From<GroupId> for u32 {
    fn from(id: GroupId) -> u32 {
        id.get()
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reasons a group cannot be seated at all, before any train is searched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No adults and no children.
    #[error("group has nobody to seat")]
    EmptyGroup,

    /// Children without any adult.
    #[error("a group needs at least one adult")]
    NoAdults,

    /// Every toddler sits on an adult's lap.
    #[error("{toddlers} toddlers but only {adults} adults to hold them")]
    TooManyToddlers { toddlers: u32, adults: u32 },

    /// More people than can be counted.
    #[error("group of {adults} adults and {children} children is too large")]
    GroupTooLarge { adults: u32, children: u32 },

    /// Only one carriage per train takes a wheelchair.
    #[error("at most 1 wheelchair user per group, got {0}")]
    UnsupportedWheelchairCount(u32),
}

/// A group asking to be seated on one train.
///
/// Lives only for one allocation attempt. Once committed, the booking exists
/// only as the carriages carrying its `group_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRequest {
    pub adults: u32,
    pub children: u32,
    pub toddlers: u32,
    pub wheelchair_count: u32,

    /// Assigned by the allocator on the first attempt and carried on every
    /// re-submission of the same booking.
    #[serde(default)]
    pub group_id: Option<GroupId>,

    /// Carriages the operator has approved; bypasses size-based dispatch.
    #[serde(default)]
    pub restricted_carriages: Option<BTreeSet<CarriageNumber>>,
}

/// Most wheelchair users one group may bring.
pub const MAX_WHEELCHAIRS: u32 = 1;

impl GroupRequest {
    pub fn new(adults: u32, children: u32, toddlers: u32, wheelchair_count: u32) -> Self {
        Self {
            adults,
            children,
            toddlers,
            wheelchair_count,
            group_id: None,
            restricted_carriages: None,
        }
    }

    /// Seats needed: adults plus children. Toddlers share an adult's seat.
    ///
    /// Saturates; [`GroupRequest::validate`] rejects groups where it would.
    pub fn group_size(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    pub fn has_wheelchair(&self) -> bool {
        self.wheelchair_count > 0
    }

    pub fn with_group_id(mut self, id: GroupId) -> Self {
        self.group_id = Some(id);
        self
    }

    pub fn with_restricted_carriages(
        mut self,
        carriages: impl IntoIterator<Item = CarriageNumber>,
    ) -> Self {
        self.restricted_carriages = Some(carriages.into_iter().collect());
        self
    }

    /// Check the group can be seated in principle.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let size = self
            .adults
            .checked_add(self.children)
            .ok_or(ValidationError::GroupTooLarge {
                adults: self.adults,
                children: self.children,
            })?;
        if size == 0 {
            return Err(ValidationError::EmptyGroup);
        }
        if self.adults == 0 {
            return Err(ValidationError::NoAdults);
        }
        if self.toddlers > self.adults {
            return Err(ValidationError::TooManyToddlers {
                toddlers: self.toddlers,
                adults: self.adults,
            });
        }
        if self.wheelchair_count > MAX_WHEELCHAIRS {
            return Err(ValidationError::UnsupportedWheelchairCount(
                self.wheelchair_count,
            ));
        }
        Ok(())
    }
}
