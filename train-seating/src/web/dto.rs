//! Data transfer objects for web requests and responses.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::allocation::{Decision, Decisions, Outcome, PendingConfirmation, Rejection};
use crate::domain::{
    Booking, Carriage, CarriageNumber, DepartureTime, GroupId, GroupRequest, Schedule, Train,
};
use crate::store::PresetSummary;

/// Request to book a group, or to continue a booking after a prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub adults: u32,

    pub children: u32,

    #[serde(default)]
    pub toddlers: u32,

    /// Wheelchair users in the group (at most one)
    #[serde(default)]
    pub wheelchair_count: u32,

    /// Set when continuing a booking that was asked about
    #[serde(default)]
    pub group_id: Option<GroupId>,

    #[serde(default)]
    pub restricted_carriages: Option<BTreeSet<CarriageNumber>>,

    /// Answers given so far, as returned by the previous response
    #[serde(default)]
    pub decisions: Decisions,

    /// The prompt being answered
    #[serde(default)]
    pub pending: Option<PendingConfirmation>,

    /// Answer to `pending`
    #[serde(default)]
    pub answer: Option<Decision>,
}

impl BookingRequest {
    pub fn group_request(&self) -> GroupRequest {
        GroupRequest {
            adults: self.adults,
            children: self.children,
            toddlers: self.toddlers,
            wheelchair_count: self.wheelchair_count,
            group_id: self.group_id,
            restricted_carriages: self.restricted_carriages.clone(),
        }
    }
}

/// Where a booking ended up.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookingStatus {
    Committed { booking: Booking },
    AwaitingConfirmation { pending: PendingConfirmation },
    Rejected { rejection: Rejection },
}

/// Response to a booking request.
///
/// `request` and `decisions` are what the client should send back, along
/// with `pending` and an answer, to continue.
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub status: BookingStatus,

    /// Human-readable summary
    pub message: String,

    pub request: GroupRequest,

    pub decisions: Decisions,
}

impl BookingResponse {
    pub fn new(outcome: Outcome, request: GroupRequest, decisions: Decisions) -> Self {
        let (status, message) = match outcome {
            Outcome::Committed(booking) => {
                let message = booking.to_string();
                (BookingStatus::Committed { booking }, message)
            }
            Outcome::AwaitingConfirmation(pending) => {
                let message = pending.to_string();
                (BookingStatus::AwaitingConfirmation { pending }, message)
            }
            Outcome::Rejected(rejection) => {
                let message = rejection.to_string();
                (BookingStatus::Rejected { rejection }, message)
            }
        };
        Self {
            status,
            message,
            request,
            decisions,
        }
    }
}

/// Query parameters for the schedule view.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    /// Hide trains that have already left
    #[serde(default)]
    pub upcoming: bool,
}

/// One train in the schedule view.
#[derive(Debug, Serialize)]
pub struct TrainView {
    pub departure: DepartureTime,

    /// Departure in 12-hour form (e.g., "2:30 PM")
    pub departure_12h: String,

    pub cancelled: bool,

    pub party_train: bool,

    pub school_name: String,

    pub accepts_public_bookings: bool,

    pub departed: bool,

    pub free_seats: u32,

    pub booked_seats: u32,

    pub group_ids: Vec<GroupId>,

    pub carriages: Vec<Carriage>,
}

impl TrainView {
    pub fn from_train(train: &Train, now: NaiveDateTime) -> Self {
        Self {
            departure: train.departure(),
            departure_12h: train.departure().to_12_hour(),
            cancelled: train.is_cancelled(),
            party_train: train.is_party_train(),
            school_name: train.school_name().to_string(),
            accepts_public_bookings: train.accepts_public_bookings(),
            departed: train.departure().minutes_from(now) < 0,
            free_seats: train.free_seats(),
            booked_seats: train.booked_seats(),
            group_ids: train.group_ids(),
            carriages: train.carriages().to_vec(),
        }
    }
}

/// A committed booking with its one-line summary.
#[derive(Debug, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,

    pub summary: String,
}

/// The schedule as the operator sees it.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub trains: Vec<TrainView>,

    pub bookings: Vec<BookingView>,
}

impl ScheduleResponse {
    pub fn new(schedule: &Schedule, now: NaiveDateTime, upcoming_only: bool) -> Self {
        let trains: Vec<TrainView> = if upcoming_only {
            schedule
                .upcoming(now)
                .map(|t| TrainView::from_train(t, now))
                .collect()
        } else {
            schedule
                .trains()
                .iter()
                .map(|t| TrainView::from_train(t, now))
                .collect()
        };

        let bookings = schedule
            .bookings()
            .into_iter()
            .filter(|b| trains.iter().any(|t| t.departure == b.departure))
            .map(|booking| BookingView {
                summary: booking.to_string(),
                booking,
            })
            .collect();

        Self { trains, bookings }
    }
}

/// Request to add a train.
#[derive(Debug, Deserialize)]
pub struct NewTrainRequest {
    pub departure: DepartureTime,

    /// Seats per carriage 1-8 (defaults to the standard layout)
    #[serde(default)]
    pub capacities: Option<[u32; 8]>,
}

/// Changes to one train. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct TrainUpdateRequest {
    /// New departure time
    #[serde(default)]
    pub departure: Option<DepartureTime>,

    #[serde(default)]
    pub cancelled: Option<bool>,

    #[serde(default)]
    pub party_train: Option<bool>,

    /// School the train is reserved for; empty to clear
    #[serde(default)]
    pub school_name: Option<String>,
}

/// Result of removing a train.
#[derive(Debug, Serialize)]
pub struct RemovedTrainResponse {
    pub departure: DepartureTime,

    /// Bookings that were aboard
    pub group_ids: Vec<GroupId>,
}

/// Result of cancelling a group's booking.
#[derive(Debug, Serialize)]
pub struct RemovedGroupResponse {
    pub group_id: GroupId,

    /// Carriages freed
    pub released: usize,
}

/// Saved presets.
#[derive(Debug, Serialize)]
pub struct PresetListResponse {
    pub presets: Vec<PresetSummary>,
}

/// Result of deleting a preset.
#[derive(Debug, Serialize)]
pub struct DeletedPresetResponse {
    pub name: String,

    pub deleted: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
