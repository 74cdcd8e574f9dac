//! Operator confirmations.
//!
//! Some placements need an operator's approval before they are committed.
//! The engine never waits for that approval: it returns a
//! [`PendingConfirmation`] and the caller re-submits the same request with
//! the answer recorded in [`Decisions`]. [`BookingAttempt`] holds that state
//! between calls.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Booking, CarriageNumber, DepartureTime, GroupId, GroupRequest, Schedule};

use super::availability::CarriagePair;
use super::engine::{Allocator, Outcome, Rejection};
use super::error::AllocationError;

/// Carriages a group falls back to when it turns down a four-seat carriage.
pub const TWO_SEAT_FALLBACK: [u8; 4] = [1, 4, 5, 8];

/// Why the engine stopped to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfirmationReason {
    /// The train the group would get leaves within the warning threshold.
    ImminentDeparture { minutes: i64 },
    /// A group of one or two would take a four-seat carriage.
    OversizedSeat,
    /// The group would be split across one of the carriage pairs.
    PairOnly { pair: CarriagePair },
    /// A group of three or four would go in carriage 4 or 5.
    MiddleCarriage,
}

impl fmt::Display for ConfirmationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationReason::ImminentDeparture { minutes } => {
                write!(f, "train leaves in {} minutes", minutes)
            }
            ConfirmationReason::OversizedSeat => {
                write!(f, "only four-seat carriages are free")
            }
            ConfirmationReason::PairOnly { pair } => {
                write!(f, "only space is across carriages {}", pair)
            }
            ConfirmationReason::MiddleCarriage => {
                write!(f, "only space is in a middle carriage")
            }
        }
    }
}

/// A halted booking, waiting on the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// The id the booking will take; re-submit with it.
    pub group_id: GroupId,
    pub reason: ConfirmationReason,
    /// The train the prompt is about.
    pub train: DepartureTime,
    /// Carriages on that train the prompt offers.
    pub carriages: Vec<CarriageNumber>,
}

impl fmt::Display for PendingConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} train: {}", self.train, self.reason)
    }
}

/// Answer to the oversized-seat prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizedChoice {
    /// Take the four-seat carriage.
    AssignAnyway,
    /// Only consider the two-seat carriages 1, 4, 5 and 8.
    TwoSeatOnly,
}

/// Everything the operator has answered so far for one booking.
///
/// `None` means the question has not been asked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decisions {
    pub imminent_departure: Option<bool>,
    pub oversized_seat: Option<OversizedChoice>,
    pub pair_only: Option<bool>,
    pub middle_carriage: Option<bool>,
    /// Trains the operator chose to pass over.
    pub skipped_trains: BTreeSet<DepartureTime>,
}

impl Decisions {
    /// Whether trains inside the warning threshold may be used.
    pub fn imminent_confirmed(&self, request: &GroupRequest) -> bool {
        self.imminent_departure == Some(true)
            || self.oversized_seat.is_some()
            || request.restricted_carriages.is_some()
    }

    pub fn is_skipped(&self, departure: DepartureTime) -> bool {
        self.skipped_trains.contains(&departure)
    }
}

/// An operator's yes or no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Decline,
}

impl Decision {
    pub fn is_accept(self) -> bool {
        self == Decision::Accept
    }
}

/// Error from driving a [`BookingAttempt`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// An answer arrived with no question outstanding
    #[error("no confirmation is pending")]
    NothingPending,

    /// The attempt already finished
    #[error("booking attempt already {0}")]
    AlreadyResolved(&'static str),
}

/// Where a booking attempt has got to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    New,
    AwaitingConfirmation(PendingConfirmation),
    Committed(Booking),
    Rejected(Rejection),
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Committed(_) | AttemptState::Rejected(_))
    }

    /// The engine's result, or `None` for an attempt that has not run.
    pub fn into_outcome(self) -> Option<Outcome> {
        match self {
            AttemptState::New => None,
            AttemptState::AwaitingConfirmation(pending) => {
                Some(Outcome::AwaitingConfirmation(pending))
            }
            AttemptState::Committed(booking) => Some(Outcome::Committed(booking)),
            AttemptState::Rejected(rejection) => Some(Outcome::Rejected(rejection)),
        }
    }
}

/// One group's booking, carried across operator prompts.
#[derive(Debug, Clone)]
pub struct BookingAttempt {
    request: GroupRequest,
    decisions: Decisions,
    state: AttemptState,
}

impl BookingAttempt {
    pub fn new(request: GroupRequest) -> Self {
        Self::with_decisions(request, Decisions::default())
    }

    /// Resume an attempt from answers the caller kept.
    pub fn with_decisions(request: GroupRequest, decisions: Decisions) -> Self {
        Self {
            request,
            decisions,
            state: AttemptState::New,
        }
    }

    /// Resume an attempt that stopped on `pending`, ready for the answer.
    pub fn awaiting(
        request: GroupRequest,
        decisions: Decisions,
        pending: PendingConfirmation,
    ) -> Self {
        Self {
            request,
            decisions,
            state: AttemptState::AwaitingConfirmation(pending),
        }
    }

    pub fn request(&self) -> &GroupRequest {
        &self.request
    }

    pub fn decisions(&self) -> &Decisions {
        &self.decisions
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    pub fn into_parts(self) -> (GroupRequest, Decisions, AttemptState) {
        (self.request, self.decisions, self.state)
    }

    /// Run the engine unless the attempt is finished or waiting on an answer.
    ///
    /// The group id is pinned on the first run, so later runs address the
    /// same booking.
    pub fn resolve(
        &mut self,
        allocator: &Allocator<'_>,
        schedule: &mut Schedule,
        now: NaiveDateTime,
    ) -> Result<&AttemptState, AllocationError> {
        if !matches!(self.state, AttemptState::New) {
            return Ok(&self.state);
        }

        self.state = match allocator.resolve(schedule, &self.request, &self.decisions, now)? {
            Outcome::Committed(booking) => {
                self.request.group_id = Some(booking.group_id);
                AttemptState::Committed(booking)
            }
            Outcome::AwaitingConfirmation(pending) => {
                self.request.group_id = Some(pending.group_id);
                AttemptState::AwaitingConfirmation(pending)
            }
            Outcome::Rejected(rejection) => AttemptState::Rejected(rejection),
        };
        Ok(&self.state)
    }

    /// Record the operator's answer to the pending prompt.
    ///
    /// The attempt goes back to `New`; call [`BookingAttempt::resolve`] again
    /// to continue.
    pub fn answer(&mut self, decision: Decision) -> Result<(), ProtocolError> {
        let pending = match &self.state {
            AttemptState::AwaitingConfirmation(pending) => pending.clone(),
            AttemptState::New => return Err(ProtocolError::NothingPending),
            AttemptState::Committed(_) => return Err(ProtocolError::AlreadyResolved("committed")),
            AttemptState::Rejected(_) => return Err(ProtocolError::AlreadyResolved("rejected")),
        };

        apply_decision(&mut self.request, &mut self.decisions, &pending, decision);
        self.state = AttemptState::New;
        Ok(())
    }
}

/// Fold an answer into the request and the decisions.
pub fn apply_decision(
    request: &mut GroupRequest,
    decisions: &mut Decisions,
    pending: &PendingConfirmation,
    decision: Decision,
) {
    request.group_id = Some(pending.group_id);
    let accept = decision.is_accept();

    match pending.reason {
        ConfirmationReason::ImminentDeparture { .. } => {
            decisions.imminent_departure = Some(accept);
        }
        ConfirmationReason::OversizedSeat => {
            if accept {
                decisions.oversized_seat = Some(OversizedChoice::AssignAnyway);
            } else {
                decisions.oversized_seat = Some(OversizedChoice::TwoSeatOnly);
                request.restricted_carriages = Some(
                    TWO_SEAT_FALLBACK
                        .into_iter()
                        .filter_map(|n| CarriageNumber::new(n).ok())
                        .collect(),
                );
            }
        }
        ConfirmationReason::PairOnly { pair } => {
            if accept {
                decisions.pair_only = Some(true);
                request.restricted_carriages = Some(pair.carriage_numbers().into_iter().collect());
            } else {
                // the prompt may come up again for a later train
                decisions.skipped_trains.insert(pending.train);
            }
        }
        ConfirmationReason::MiddleCarriage => {
            decisions.middle_carriage = Some(accept);
        }
    }
}
