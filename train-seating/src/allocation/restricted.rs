//! Selection limited to carriages the operator has approved.

use std::collections::BTreeSet;

use tracing::trace;

use crate::domain::{Carriage, CarriageNumber, GroupRequest, Train};

use super::best_fit::{best_run, check_supervision};
use super::error::SelectError;
use super::placement::Placement;
use super::wheelchair::select_wheelchair_within;

/// Seat the group on `train` using only the `approved` carriages.
///
/// Size classes are ignored. A group that fits in one approved carriage
/// gets the smallest such carriage; otherwise the approved carriages are
/// treated as a best-fit run, one adult per carriage.
pub fn select_restricted(
    train: &Train,
    group: &GroupRequest,
    approved: &BTreeSet<CarriageNumber>,
) -> Result<Placement, SelectError> {
    let size = group.group_size();
    let candidates: Vec<&Carriage> = train
        .free_carriages()
        .filter(|c| approved.contains(&c.number()))
        .collect();

    let total: u32 = candidates.iter().map(|c| c.capacity()).sum();
    if total < size {
        return Err(SelectError::NoFit);
    }

    if group.has_wheelchair() {
        return select_wheelchair_within(&candidates, group);
    }
    if group.adults < 1 {
        return Err(SelectError::NoAdults);
    }

    if let Some(carriage) = candidates
        .iter()
        .filter(|c| c.fits(size))
        .min_by_key(|c| c.capacity())
    {
        trace!(carriage = %carriage.number(), size, "restricted single carriage");
        return Ok(Placement::single(carriage, group));
    }

    let run = best_run(&candidates, size).ok_or(SelectError::NoFit)?;
    check_supervision(group, run.carriages.len())?;
    trace!(size, carriages = run.carriages.len(), "restricted run");
    Ok(Placement::fill_run(&run.carriages, group))
}
