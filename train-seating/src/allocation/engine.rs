//! The booking orchestrator.
//!
//! [`Allocator::resolve`] takes one group request and either commits it to
//! the first train that can seat it, stops to ask the operator about a
//! placement that needs approval, or rejects it. Nothing in the schedule
//! changes unless the result is [`Outcome::Committed`].

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::domain::{Booking, CarriageNumber, GroupId, GroupRequest, Schedule, Train};

use super::availability::sole_pair_option;
use super::best_fit::select_best_fit;
use super::config::AllocationConfig;
use super::eligibility::{Eligibility, classify, is_assignable};
use super::error::{AllocationError, SelectError};
use super::protocol::{ConfirmationReason, Decisions, PendingConfirmation};
use super::restricted::select_restricted;
use super::single::{Selection, SizeClass, select_medium, select_small};
use super::wheelchair::{can_fit_wheelchair, free_wheelchair_carriages, select_wheelchair};

/// Capacity of the small carriages a group of one or two should get.
const TWO_SEATS: u32 = 2;

/// Capacity of the large carriages.
const FOUR_SEATS: u32 = 4;

/// Why no train could take the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Every train has left, is closed, or was passed over.
    NoEligibleTrains,
    /// Open trains exist but none had room.
    NoCapacityFound {
        trains_tried: usize,
        /// Trains that had room but too few adults for the carriages needed.
        supervision_shortfalls: usize,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoEligibleTrains => write!(f, "no upcoming train is taking bookings"),
            Rejection::NoCapacityFound {
                trains_tried,
                supervision_shortfalls: 0,
            } => write!(f, "no space on any of {} upcoming trains", trains_tried),
            Rejection::NoCapacityFound {
                trains_tried,
                supervision_shortfalls,
            } => write!(
                f,
                "no space on any of {} upcoming trains ({} need more adults)",
                trains_tried, supervision_shortfalls
            ),
        }
    }
}

/// Result of one call to [`Allocator::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed(Booking),
    AwaitingConfirmation(PendingConfirmation),
    Rejected(Rejection),
}

/// Whether `train` could plausibly take the group, without placing it.
///
/// Used to decide if an imminent train is worth asking about.
pub fn group_can_fit(train: &Train, request: &GroupRequest) -> bool {
    if request.has_wheelchair() {
        return can_fit_wheelchair(train, request);
    }

    let size = request.group_size();
    if SizeClass::of(size) == SizeClass::Medium && request.adults >= 2 {
        let free = |n: u8| {
            CarriageNumber::new(n)
                .map(|n| !train.carriage(n).is_occupied())
                .unwrap_or(false)
        };
        if (free(4) && free(5)) || (free(1) && free(8)) {
            return true;
        }
    }

    size <= train.free_seats()
}

/// Whether `booking` could be the committed form of `request`.
///
/// Seat count, wheelchair and toddlers must agree. Wheelchair runs may
/// drop a toddler remainder, so there the booking may hold fewer. Two
/// parties with the same shape cannot be told apart.
fn booking_matches(booking: &Booking, request: &GroupRequest) -> bool {
    let toddlers_match = if request.has_wheelchair() {
        booking.toddlers() <= request.toddlers
    } else {
        booking.toddlers() == request.toddlers
    };
    booking.seats() == request.group_size()
        && booking.has_wheelchair() == request.has_wheelchair()
        && toddlers_match
}

/// Allocates groups to trains.
pub struct Allocator<'a> {
    config: &'a AllocationConfig,
}

impl<'a> Allocator<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocationConfig {
        self.config
    }

    /// Place `request` on the earliest train that can take it.
    ///
    /// Re-submitting a request whose group id is already booked returns the
    /// existing booking and changes nothing.
    pub fn resolve(
        &self,
        schedule: &mut Schedule,
        request: &GroupRequest,
        decisions: &Decisions,
        now: NaiveDateTime,
    ) -> Result<Outcome, AllocationError> {
        request.validate()?;

        let group_id = request
            .group_id
            .unwrap_or_else(|| schedule.next_group_id());

        if let Some(existing) = schedule.booking(group_id) {
            if !booking_matches(&existing, request) {
                return Err(AllocationError::GroupIdInUse(group_id));
            }
            debug!(group_id = %group_id, "group already booked");
            return Ok(Outcome::Committed(existing));
        }

        if let Some(pending) = self.confirmation_gate(schedule, request, decisions, now, group_id) {
            info!(
                group_id = %group_id,
                train = %pending.train,
                reason = %pending.reason,
                "booking needs confirmation"
            );
            return Ok(Outcome::AwaitingConfirmation(pending));
        }

        let imminent_confirmed = decisions.imminent_confirmed(request);
        let mut trains_tried = 0;
        let mut supervision_shortfalls = 0;

        for index in 0..schedule.len() {
            let train = &schedule.trains()[index];
            let departure = train.departure();
            if decisions.is_skipped(departure)
                || !is_assignable(train, now, self.config, imminent_confirmed)
            {
                trace!(train = %departure, "train not eligible");
                continue;
            }
            trains_tried += 1;

            match self.select_on(train, request, decisions) {
                Ok(Selection::Chosen(placement)) => {
                    let booking = placement.commit(&mut schedule.trains_mut()[index], group_id)?;
                    info!(
                        group_id = %group_id,
                        train = %departure,
                        carriages = ?booking.carriage_numbers(),
                        "booking committed"
                    );
                    return Ok(Outcome::Committed(booking));
                }
                Ok(Selection::NeedsConfirmation { reason, carriages }) => {
                    info!(group_id = %group_id, train = %departure, reason = %reason, "booking needs confirmation");
                    return Ok(Outcome::AwaitingConfirmation(PendingConfirmation {
                        group_id,
                        reason,
                        train: departure,
                        carriages,
                    }));
                }
                Err(err @ SelectError::InsufficientSupervision { .. }) => {
                    debug!(train = %departure, error = %err, "not enough adults");
                    supervision_shortfalls += 1;
                }
                Err(err) => {
                    debug!(train = %departure, error = %err, "no placement");
                }
            }
        }

        let rejection = if trains_tried == 0 {
            Rejection::NoEligibleTrains
        } else {
            Rejection::NoCapacityFound {
                trains_tried,
                supervision_shortfalls,
            }
        };
        info!(group_id = %group_id, reason = %rejection, "booking rejected");
        Ok(Outcome::Rejected(rejection))
    }

    /// Dispatch to the selector for this request.
    fn select_on(
        &self,
        train: &Train,
        request: &GroupRequest,
        decisions: &Decisions,
    ) -> Result<Selection, SelectError> {
        if let Some(approved) = &request.restricted_carriages {
            return select_restricted(train, request, approved).map(Selection::Chosen);
        }
        if request.has_wheelchair() {
            return select_wheelchair(&[train], request).map(|c| Selection::Chosen(c.placement));
        }
        match SizeClass::of(request.group_size()) {
            SizeClass::Small => select_small(train.carriages(), request).map(Selection::Chosen),
            SizeClass::Medium => {
                select_medium(train.carriages(), request, decisions.middle_carriage)
            }
            SizeClass::Large => {
                select_best_fit(train.carriages(), request, self.config).map(Selection::Chosen)
            }
        }
    }

    /// Trains that have not left, take public bookings and were not passed over.
    fn open_trains<'s>(
        &self,
        schedule: &'s Schedule,
        decisions: &Decisions,
        now: NaiveDateTime,
    ) -> Vec<&'s Train> {
        schedule
            .trains()
            .iter()
            .filter(|t| {
                classify(t, now, self.config).is_bookable() && !decisions.is_skipped(t.departure())
            })
            .collect()
    }

    /// The first prompt this request needs, if any.
    fn confirmation_gate(
        &self,
        schedule: &Schedule,
        request: &GroupRequest,
        decisions: &Decisions,
        now: NaiveDateTime,
        group_id: GroupId,
    ) -> Option<PendingConfirmation> {
        let open = self.open_trains(schedule, decisions, now);

        let (train, reason, carriages) = oversized_gate(&open, request, decisions)
            .or_else(|| pair_gate(&open, request, decisions))
            .or_else(|| self.imminent_gate(&open, request, decisions, now))?;

        Some(PendingConfirmation {
            group_id,
            reason,
            train: train.departure(),
            carriages,
        })
    }

    /// Ask before using a train that leaves within the warning threshold.
    fn imminent_gate<'s>(
        &self,
        open: &[&'s Train],
        request: &GroupRequest,
        decisions: &Decisions,
        now: NaiveDateTime,
    ) -> Option<Gate<'s>> {
        if decisions.imminent_departure.is_some()
            || decisions.oversized_seat.is_some()
            || request.restricted_carriages.is_some()
        {
            return None;
        }

        let (train, minutes) = open.iter().find_map(|&t| match classify(t, now, self.config) {
            Eligibility::Imminent { minutes } if t.has_free_carriage() => Some((t, minutes)),
            _ => None,
        })?;

        if !group_can_fit(train, request) {
            return None;
        }
        if request.has_wheelchair()
            && free_wheelchair_carriages(train) < request.wheelchair_count as usize
        {
            return None;
        }

        Some((
            train,
            ConfirmationReason::ImminentDeparture { minutes },
            free_numbers(train, |_| true),
        ))
    }
}

type Gate<'s> = (&'s Train, ConfirmationReason, Vec<CarriageNumber>);

fn free_numbers(train: &Train, keep: impl Fn(u32) -> bool) -> Vec<CarriageNumber> {
    train
        .free_carriages()
        .filter(|c| keep(c.capacity()))
        .map(|c| c.number())
        .collect()
}

/// Ask before putting one or two people in a four-seat carriage.
///
/// Looks at the first open train that can seat the group at all. If it
/// has no two-seat carriage left but does have a four-seat one, the
/// operator decides.
fn oversized_gate<'s>(
    open: &[&'s Train],
    request: &GroupRequest,
    decisions: &Decisions,
) -> Option<Gate<'s>> {
    let size = request.group_size();
    if SizeClass::of(size) != SizeClass::Small
        || request.has_wheelchair()
        || request.restricted_carriages.is_some()
        || decisions.oversized_seat.is_some()
    {
        return None;
    }

    let train = open
        .iter()
        .copied()
        .find(|t| t.free_carriages().any(|c| c.capacity() >= size))?;

    let has_two_seat = train.free_carriages().any(|c| c.capacity() == TWO_SEATS);
    let four_seat = free_numbers(train, |capacity| capacity == FOUR_SEATS);
    if has_two_seat || four_seat.is_empty() {
        return None;
    }

    Some((train, ConfirmationReason::OversizedSeat, four_seat))
}

/// Ask before splitting a group of three or four across carriages 4/5 or 1/8.
///
/// Looks at open trains in order until one can seat the group in a single
/// carriage (no prompt) or can only seat it across one of the pairs.
fn pair_gate<'s>(
    open: &[&'s Train],
    request: &GroupRequest,
    decisions: &Decisions,
) -> Option<Gate<'s>> {
    let size = request.group_size();
    if SizeClass::of(size) != SizeClass::Medium
        || request.adults < 2
        || request.has_wheelchair()
        || request.restricted_carriages.is_some()
        || decisions.pair_only.is_some()
    {
        return None;
    }

    for &train in open {
        if train.free_carriages().any(|c| c.capacity() >= size) {
            return None;
        }
        if let Some(pair) = sole_pair_option(train.carriages(), size) {
            return Some((
                train,
                ConfirmationReason::PairOnly { pair },
                pair.carriage_numbers(),
            ));
        }
    }
    None
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
