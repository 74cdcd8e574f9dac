//! Single-carriage selection for groups of up to four.
//!
//! Small groups (1-2) prefer the two-seat carriages at the ends and middle of
//! the train; medium groups (3-4) prefer the four-seat carriages. A group
//! handled here always sits together in one carriage.

use tracing::trace;

use crate::domain::{Carriage, CarriageNumber, GroupRequest};

use super::availability::only_c4_c5_available;
use super::error::SelectError;
use super::placement::Placement;
use super::protocol::ConfirmationReason;

/// Carriage preference for groups of 1-2.
const SMALL_PREFERENCE: [u8; 8] = [1, 8, 4, 5, 2, 3, 6, 7];

/// Carriage preference for groups of 3-4.
const MEDIUM_PREFERENCE: [u8; 6] = [2, 3, 6, 7, 1, 8];

/// Middle carriages a medium group only gets as a last resort.
const MEDIUM_LAST_RESORT: [u8; 2] = [4, 5];

/// Which selector a group size dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// 1-2 people
    Small,
    /// 3-4 people
    Medium,
    /// 5 or more
    Large,
}

impl SizeClass {
    pub fn of(group_size: u32) -> Self {
        match group_size {
            0..=2 => SizeClass::Small,
            3..=4 => SizeClass::Medium,
            _ => SizeClass::Large,
        }
    }
}

/// What a selector decided for one train.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Ready to commit.
    Chosen(Placement),
    /// A placement exists but the operator must approve it first.
    NeedsConfirmation {
        reason: ConfirmationReason,
        carriages: Vec<CarriageNumber>,
    },
}

/// First free carriage, in `order`, that seats `size` on its own.
fn first_fitting<'a>(carriages: &'a [Carriage], order: &[u8], size: u32) -> Option<&'a Carriage> {
    order.iter().find_map(|&n| {
        carriages
            .iter()
            .find(|c| c.number().get() == n && c.fits(size))
    })
}

/// Seat a group of 1-2 in one carriage.
///
/// Walks the small-group preference order, falling back to the smallest
/// free carriage that fits.
pub fn select_small(carriages: &[Carriage], group: &GroupRequest) -> Result<Placement, SelectError> {
    if group.adults < 1 {
        return Err(SelectError::NoAdults);
    }
    let size = group.group_size();

    let chosen = first_fitting(carriages, &SMALL_PREFERENCE, size).or_else(|| {
        carriages
            .iter()
            .filter(|c| c.fits(size))
            .min_by_key(|c| c.capacity())
    });

    match chosen {
        Some(carriage) => {
            trace!(carriage = %carriage.number(), size, "small group placed");
            Ok(Placement::single(carriage, group))
        }
        None => Err(SelectError::NoFit),
    }
}

/// Seat a group of 3-4 in one carriage.
///
/// Carriages 4 and 5 are only used when they are the sole fit on the train,
/// or when the operator approves it (`middle_carriage`) for a group with at
/// least two adults. Without a decision yet, the approval is requested.
pub fn select_medium(
    carriages: &[Carriage],
    group: &GroupRequest,
    middle_carriage: Option<bool>,
) -> Result<Selection, SelectError> {
    if group.adults < 1 {
        return Err(SelectError::NoAdults);
    }
    let size = group.group_size();

    if let Some(carriage) = first_fitting(carriages, &MEDIUM_PREFERENCE, size) {
        trace!(carriage = %carriage.number(), size, "medium group placed");
        return Ok(Selection::Chosen(Placement::single(carriage, group)));
    }

    let last_resort = first_fitting(carriages, &MEDIUM_LAST_RESORT, size);

    if only_c4_c5_available(carriages, size)
        && let Some(carriage) = last_resort
    {
        trace!(carriage = %carriage.number(), size, "middle carriage is the only fit");
        return Ok(Selection::Chosen(Placement::single(carriage, group)));
    }

    if group.adults >= 2
        && let Some(carriage) = last_resort
    {
        return match middle_carriage {
            Some(true) => Ok(Selection::Chosen(Placement::single(carriage, group))),
            Some(false) => Err(SelectError::NoFit),
            None => Ok(Selection::NeedsConfirmation {
                reason: ConfirmationReason::MiddleCarriage,
                carriages: vec![carriage.number()],
            }),
        };
    }

    Err(SelectError::NoFit)
}
