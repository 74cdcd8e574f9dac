//! Contiguous runs of carriages for groups of five or more.

use tracing::trace;

use crate::domain::{Carriage, GroupRequest};

use super::config::AllocationConfig;
use super::error::SelectError;
use super::placement::Placement;

/// Carriages a run should avoid if it can.
const AVOIDED: [u8; 2] = [4, 5];

/// Carriages withheld from 3-4 person groups when the restriction is on.
const RESTRICTED_FOR_MEDIUM: [u8; 4] = [1, 4, 5, 8];

/// A run of free carriages, adjacent in list order, that seats the group.
#[derive(Debug, Clone)]
pub(crate) struct RunCandidate<'a> {
    pub carriages: Vec<&'a Carriage>,
    pub capacity: u32,
    pub avoid_count: usize,
}

impl RunCandidate<'_> {
    /// Lower is better: fewest carriages, then fewest of 4/5, then least waste.
    fn rank(&self) -> (usize, usize, u32) {
        (self.carriages.len(), self.avoid_count, self.capacity)
    }
}

/// The best run of free carriages in `carriages` that seats `size` people.
///
/// From every start index the run grows rightwards until it is large
/// enough, and is abandoned at the first occupied carriage. Ties keep the
/// earliest start.
pub(crate) fn best_run<'a>(carriages: &[&'a Carriage], size: u32) -> Option<RunCandidate<'a>> {
    let mut best: Option<RunCandidate<'a>> = None;

    for start in 0..carriages.len() {
        let mut run = Vec::new();
        let mut capacity = 0;
        let mut avoid_count = 0;

        for &carriage in &carriages[start..] {
            if carriage.is_occupied() {
                break;
            }
            run.push(carriage);
            capacity += carriage.capacity();
            if AVOIDED.contains(&carriage.number().get()) {
                avoid_count += 1;
            }
            if capacity >= size {
                let candidate = RunCandidate {
                    carriages: run,
                    capacity,
                    avoid_count,
                };
                if best.as_ref().is_none_or(|b| candidate.rank() < b.rank()) {
                    best = Some(candidate);
                }
                break;
            }
        }
    }

    best
}

/// Seat a large group across the best contiguous run on one train.
///
/// Every carriage in the run needs an adult of its own; a run that would
/// leave a carriage unsupervised fails with `InsufficientSupervision`.
pub fn select_best_fit(
    carriages: &[Carriage],
    group: &GroupRequest,
    config: &AllocationConfig,
) -> Result<Placement, SelectError> {
    let size = group.group_size();

    let restrict = config.restrict_1_4_5_8_for_medium_groups && (3..=4).contains(&size);
    let candidates: Vec<&Carriage> = carriages
        .iter()
        .filter(|c| !restrict || !RESTRICTED_FOR_MEDIUM.contains(&c.number().get()))
        .collect();

    let run = best_run(&candidates, size).ok_or(SelectError::NoFit)?;
    check_supervision(group, run.carriages.len())?;

    trace!(
        size,
        carriages = run.carriages.len(),
        waste = run.capacity - size,
        "best-fit run chosen"
    );
    Ok(Placement::fill_run(&run.carriages, group))
}

/// One adult per occupied carriage.
pub(crate) fn check_supervision(group: &GroupRequest, carriages: usize) -> Result<(), SelectError> {
    if (group.adults as usize) < carriages {
        return Err(SelectError::InsufficientSupervision {
            adults: group.adults,
            carriages,
        });
    }
    Ok(())
}
