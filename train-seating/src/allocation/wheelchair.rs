//! Seating for groups that bring a wheelchair.
//!
//! Only carriage 2 takes a wheelchair, and the chair costs it a seat: it is
//! treated as seating at most [`Carriage::WHEELCHAIR_SEATS`]. A group that
//! needs more room than that spills into neighbouring carriages, which must
//! be consecutively numbered.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::domain::{Carriage, GroupRequest, MAX_WHEELCHAIRS, Train};

use super::best_fit::check_supervision;
use super::error::SelectError;
use super::placement::{Placement, Seat};

/// The winning run across a set of trains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelchairChoice {
    /// Index into the trains passed to [`select_wheelchair`].
    pub train_index: usize,
    pub placement: Placement,
}

#[derive(Debug)]
struct WheelchairRun<'a> {
    waste: u32,
    carriages: Vec<&'a Carriage>,
}

/// Best run of consecutively numbered free carriages that seats the group
/// and includes enough wheelchair carriages.
fn best_run<'a>(carriages: &[&'a Carriage], group: &GroupRequest) -> Option<WheelchairRun<'a>> {
    let free: BTreeMap<u8, &'a Carriage> = carriages
        .iter()
        .filter(|c| !c.is_occupied())
        .map(|&c| (c.number().get(), c))
        .collect();

    let wheelchair_carriages = free
        .values()
        .filter(|c| c.number().is_wheelchair_accessible())
        .count();
    if wheelchair_carriages < group.wheelchair_count as usize {
        return None;
    }

    let size = group.group_size();
    let last = free.keys().next_back().copied()?;
    let mut best: Option<WheelchairRun<'a>> = None;

    for start in 1..=last {
        let mut run = Vec::new();
        let mut capacity = 0;
        let mut wheelchair_slots = 0;

        for number in start..=last {
            let Some(&carriage) = free.get(&number) else {
                break;
            };
            let is_slot = carriage.number().is_wheelchair_accessible();
            if is_slot {
                wheelchair_slots += 1;
            }
            capacity += carriage.effective_capacity(is_slot);
            run.push(carriage);

            if capacity >= size && wheelchair_slots >= group.wheelchair_count {
                let waste = capacity - size;
                if best.as_ref().is_none_or(|b| waste < b.waste) {
                    best = Some(WheelchairRun {
                        waste,
                        carriages: run,
                    });
                }
                break;
            }
        }
    }

    best
}

/// Split the group across `run`.
///
/// Each carriage is filled up to its usable seats, holding one seat back
/// for every wheelchair carriage still ahead so the wheelchair user is never
/// left without a seat. Toddlers are shared out evenly; the remainder of
/// the division is not placed.
fn fill(run: &[&Carriage], group: &GroupRequest) -> Placement {
    let mut remaining = group.group_size();
    let mut toddlers = group.toddlers;
    let mut wheelchairs_needed = group.wheelchair_count;
    let run_len = run.len() as u32;
    let mut seats = Vec::with_capacity(run.len());

    for (i, carriage) in run.iter().enumerate() {
        let is_wheelchair = carriage.number().is_wheelchair_accessible() && wheelchairs_needed > 0;
        let held_back = run[i + 1..]
            .iter()
            .filter(|c| c.number().is_wheelchair_accessible())
            .count()
            .min(wheelchairs_needed.saturating_sub(u32::from(is_wheelchair)) as usize)
            as u32;

        let available = remaining.saturating_sub(held_back);
        let assigned = available.min(carriage.effective_capacity(is_wheelchair));
        if assigned == 0 {
            continue;
        }
        let laps = assigned.min(toddlers / run_len);

        seats.push(Seat {
            number: carriage.number(),
            seats: assigned,
            toddlers: laps,
            wheelchair: is_wheelchair,
        });
        remaining -= assigned;
        toddlers -= laps;
        if is_wheelchair {
            wheelchairs_needed -= 1;
        }
    }

    Placement::from_seats(seats)
}

fn check_request(group: &GroupRequest) -> Result<(), SelectError> {
    if !group.has_wheelchair() {
        return Err(SelectError::NoFit);
    }
    check_supervision(group, group.wheelchair_count as usize)
}

/// Search every train in `trains` for the run that wastes the fewest seats.
///
/// Earlier trains win ties. If the winning run has more carriages than the
/// group has adults the whole search fails; the runner-up is not tried.
pub fn select_wheelchair(
    trains: &[&Train],
    group: &GroupRequest,
) -> Result<WheelchairChoice, SelectError> {
    check_request(group)?;

    let mut best: Option<(usize, WheelchairRun<'_>)> = None;
    for (train_index, train) in trains.iter().enumerate() {
        let carriages: Vec<&Carriage> = train.carriages().iter().collect();
        if let Some(run) = best_run(&carriages, group)
            && best.as_ref().is_none_or(|(_, b)| run.waste < b.waste)
        {
            trace!(
                train = %train.departure(),
                waste = run.waste,
                "wheelchair candidate"
            );
            best = Some((train_index, run));
        }
    }

    let (train_index, run) = best.ok_or(SelectError::NoFit)?;
    check_supervision(group, run.carriages.len())?;

    debug!(
        train = %trains[train_index].departure(),
        carriages = run.carriages.len(),
        waste = run.waste,
        "wheelchair run chosen"
    );
    Ok(WheelchairChoice {
        train_index,
        placement: fill(&run.carriages, group),
    })
}

/// Wheelchair search restricted to a given set of carriages on one train.
pub(crate) fn select_wheelchair_within(
    carriages: &[&Carriage],
    group: &GroupRequest,
) -> Result<Placement, SelectError> {
    check_request(group)?;
    let run = best_run(carriages, group).ok_or(SelectError::NoFit)?;
    check_supervision(group, run.carriages.len())?;
    Ok(fill(&run.carriages, group))
}

/// Quick check of whether `train` could possibly take a wheelchair group.
///
/// Looks only at total free seats, not at where they are.
pub fn can_fit_wheelchair(train: &Train, group: &GroupRequest) -> bool {
    group.group_size() <= train.free_seats()
        && group.wheelchair_count <= MAX_WHEELCHAIRS
}

/// Free wheelchair carriages on `train`.
pub fn free_wheelchair_carriages(train: &Train) -> usize {
    train
        .free_carriages()
        .filter(|c| c.number().is_wheelchair_accessible())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CarriageNumber, DepartureTime, GroupId};

    fn num(n: u8) -> CarriageNumber {
        CarriageNumber::new(n).unwrap()
    }

    fn train_at(time: &str, capacities: [u32; 8], occupied: &[u8]) -> Train {
        let mut t =
            Train::with_capacities(DepartureTime::parse_hhmm(time).unwrap(), capacities).unwrap();
        for &n in occupied {
            t.carriage_mut(num(n))
                .assign(GroupId::new(30).unwrap(), 1, 0, false)
                .unwrap();
        }
        t
    }

    const STD: [u32; 8] = [2, 4, 4, 2, 2, 4, 4, 2];

    fn split(p: &Placement) -> Vec<(u8, u32, bool)> {
        p.seats()
            .iter()
            .map(|s| (s.number.get(), s.seats, s.wheelchair))
            .collect()
    }

    #[test]
    fn lone_wheelchair_carriage_capped_at_three() {
        let t = train_at("10:00", STD, &[1, 3, 4, 5, 6, 7, 8]);
        let choice = select_wheelchair(&[&t], &GroupRequest::new(2, 1, 0, 1)).unwrap();
        assert_eq!(choice.train_index, 0);
        assert_eq!(split(&choice.placement), vec![(2, 3, true)]);
    }

    #[test]
    fn four_do_not_fit_in_capped_carriage() {
        let t = train_at("10:00", STD, &[1, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            select_wheelchair(&[&t], &GroupRequest::new(2, 2, 0, 1)),
            Err(SelectError::NoFit)
        );
    }

    #[test]
    fn spills_into_next_carriage() {
        let t = train_at("10:00", STD, &[1]);
        let choice = select_wheelchair(&[&t], &GroupRequest::new(2, 3, 0, 1)).unwrap();
        assert_eq!(split(&choice.placement), vec![(2, 3, true), (3, 2, false)]);
    }

    #[test]
    fn run_must_be_consecutively_numbered() {
        // 3 is taken, so 2 can only pair with 1
        let t = train_at("10:00", STD, &[3]);
        let choice = select_wheelchair(&[&t], &GroupRequest::new(2, 2, 0, 1)).unwrap();
        assert_eq!(split(&choice.placement), vec![(1, 2, false), (2, 2, true)]);

        let t = train_at("10:00", STD, &[1, 3]);
        assert_eq!(
            select_wheelchair(&[&t], &GroupRequest::new(2, 2, 0, 1)),
            Err(SelectError::NoFit)
        );
    }

    #[test]
    fn wheelchair_carriage_keeps_a_seat() {
        // carriage 1 alone could seat all three
        let t = train_at("10:00", [4, 2, 4, 2, 2, 4, 4, 2], &[3]);
        let choice = select_wheelchair(&[&t], &GroupRequest::new(2, 1, 0, 1)).unwrap();
        assert_eq!(split(&choice.placement), vec![(1, 2, false), (2, 1, true)]);
    }

    #[test]
    fn least_waste_across_trains() {
        // four people: the early train's [1, 2] wastes one seat, the late
        // train's [2, 3] wastes three
        let early = train_at("10:00", STD, &[3]);
        let late = train_at("11:00", STD, &[1]);
        let choice = select_wheelchair(&[&early, &late], &GroupRequest::new(2, 2, 0, 1)).unwrap();
        assert_eq!(choice.train_index, 0);

        // three people: a two-seat carriage 2 forces a spill on the early
        // train, while the late train's carriage 2 fits exactly
        let early = train_at("10:00", [2, 2, 4, 2, 2, 4, 4, 2], &[]);
        let choice = select_wheelchair(&[&early, &late], &GroupRequest::new(2, 1, 0, 1)).unwrap();
        assert_eq!(choice.train_index, 1);
        assert_eq!(split(&choice.placement), vec![(2, 3, true)]);
    }

    #[test]
    fn earlier_train_wins_ties() {
        let a = train_at("10:00", STD, &[]);
        let b = train_at("11:00", STD, &[]);
        let choice = select_wheelchair(&[&a, &b], &GroupRequest::new(1, 2, 0, 1)).unwrap();
        assert_eq!(choice.train_index, 0);
    }

    #[test]
    fn taken_wheelchair_carriage_rules_train_out() {
        let a = train_at("10:00", STD, &[2]);
        let b = train_at("11:00", STD, &[]);
        let choice = select_wheelchair(&[&a, &b], &GroupRequest::new(1, 1, 0, 1)).unwrap();
        assert_eq!(choice.train_index, 1);
        assert_eq!(free_wheelchair_carriages(&a), 0);
        assert_eq!(free_wheelchair_carriages(&b), 1);
    }

    #[test]
    fn whole_search_fails_on_supervision() {
        // the first train's [1, 2] wastes nothing but needs two adults; the
        // second train's lone carriage 2 would do, yet is never tried
        let tight = train_at("10:00", [1, 1, 4, 2, 2, 4, 4, 2], &[]);
        let roomy = train_at("11:00", STD, &[]);
        let group = GroupRequest::new(1, 1, 0, 1);

        assert_eq!(
            select_wheelchair(&[&tight, &roomy], &group),
            Err(SelectError::InsufficientSupervision {
                adults: 1,
                carriages: 2
            })
        );
        assert_eq!(select_wheelchair(&[&roomy], &group).unwrap().train_index, 0);
    }

    #[test]
    fn toddlers_shared_by_division() {
        let t = train_at("10:00", STD, &[1]);
        let choice = select_wheelchair(&[&t], &GroupRequest::new(3, 2, 3, 1)).unwrap();
        let toddlers: Vec<u32> = choice.placement.seats().iter().map(|s| s.toddlers).collect();
        // 3 / 2 carriages = 1 each; the leftover toddler is not placed
        assert_eq!(toddlers, vec![1, 1]);
    }

    #[test]
    fn needs_a_wheelchair_user() {
        let t = train_at("10:00", STD, &[]);
        assert_eq!(
            select_wheelchair(&[&t], &GroupRequest::new(2, 0, 0, 0)),
            Err(SelectError::NoFit)
        );
    }

    #[test]
    fn within_a_subset() {
        let t = train_at("10:00", STD, &[]);
        let subset: Vec<&Carriage> = [2, 3].iter().map(|&n| t.carriage(num(n))).collect();
        let p = select_wheelchair_within(&subset, &GroupRequest::new(2, 3, 0, 1)).unwrap();
        assert_eq!(split(&p), vec![(2, 3, true), (3, 2, false)]);

        let no_chair_carriage: Vec<&Carriage> = [6, 7].iter().map(|&n| t.carriage(num(n))).collect();
        assert_eq!(
            select_wheelchair_within(&no_chair_carriage, &GroupRequest::new(2, 0, 0, 1)),
            Err(SelectError::NoFit)
        );
    }

    #[test]
    fn rough_fit_check() {
        let t = train_at("10:00", STD, &[2, 3, 6, 7]);
        assert!(can_fit_wheelchair(&t, &GroupRequest::new(2, 2, 0, 1)));
        assert!(!can_fit_wheelchair(&t, &GroupRequest::new(5, 4, 0, 1)));
        assert!(!can_fit_wheelchair(&t, &GroupRequest::new(2, 0, 0, 2)));
    }
}
