//! Which trains can take a new booking right now.

use chrono::NaiveDateTime;

use crate::domain::Train;

use super::config::AllocationConfig;

/// Where a train stands for a booking made at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Cancelled, a party train, or reserved for a school.
    Closed,
    /// Already left.
    Departed,
    /// Leaves within the warning threshold; needs operator confirmation.
    Imminent { minutes: i64 },
    /// Open for booking without any prompt.
    Open { minutes: i64 },
}

impl Eligibility {
    /// Whether a booking may go on this train, given whether the operator
    /// has confirmed an imminent departure.
    pub fn allows(self, imminent_confirmed: bool) -> bool {
        match self {
            Eligibility::Closed | Eligibility::Departed => false,
            Eligibility::Imminent { .. } => imminent_confirmed,
            Eligibility::Open { .. } => true,
        }
    }

    /// Open or imminent: the train has not left and takes public bookings.
    pub fn is_bookable(self) -> bool {
        matches!(self, Eligibility::Imminent { .. } | Eligibility::Open { .. })
    }
}

/// Minutes until the train leaves, rounded up. Negative once departed.
pub fn minutes_until_departure(train: &Train, now: NaiveDateTime) -> i64 {
    train.departure().minutes_from(now)
}

/// Classify a train against the clock and its service flags.
pub fn classify(train: &Train, now: NaiveDateTime, config: &AllocationConfig) -> Eligibility {
    if !train.accepts_public_bookings() {
        return Eligibility::Closed;
    }
    let minutes = minutes_until_departure(train, now);
    if minutes < 0 {
        Eligibility::Departed
    } else if minutes <= config.warning_threshold().num_minutes() {
        Eligibility::Imminent { minutes }
    } else {
        Eligibility::Open { minutes }
    }
}

/// Whether `train` is a candidate for a new booking.
pub fn is_assignable(
    train: &Train,
    now: NaiveDateTime,
    config: &AllocationConfig,
    confirmed: bool,
) -> bool {
    classify(train, now, config).allows(confirmed)
}
