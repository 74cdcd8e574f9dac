//! Committed bookings, read back from the schedule.

use std::fmt;

use serde::Serialize;

use super::carriage::CarriageNumber;
use super::group::GroupId;
use super::time::DepartureTime;
use super::train::Train;

/// One carriage's share of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookedCarriage {
    pub number: CarriageNumber,
    pub seats: u32,
    pub toddlers: u32,
    pub wheelchair: bool,
}

/// Every carriage carrying one group id. Always on a single train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub group_id: GroupId,
    pub departure: DepartureTime,
    pub carriages: Vec<BookedCarriage>,
}

impl Booking {
    /// Collect the booking for `group_id` on `train`, if it has any carriages there.
    pub fn from_train(train: &Train, group_id: GroupId) -> Option<Self> {
        let carriages: Vec<BookedCarriage> = train
            .carriages()
            .iter()
            .filter(|c| c.group_id() == Some(group_id))
            .map(|c| BookedCarriage {
                number: c.number(),
                seats: c.group_size(),
                toddlers: c.toddlers(),
                wheelchair: c.is_wheelchair(),
            })
            .collect();

        if carriages.is_empty() {
            return None;
        }
        Some(Self {
            group_id,
            departure: train.departure(),
            carriages,
        })
    }

    pub fn seats(&self) -> u32 {
        self.carriages.iter().map(|c| c.seats).sum()
    }

    pub fn toddlers(&self) -> u32 {
        self.carriages.iter().map(|c| c.toddlers).sum()
    }

    pub fn has_wheelchair(&self) -> bool {
        self.carriages.iter().any(|c| c.wheelchair)
    }

    pub fn carriage_numbers(&self) -> Vec<CarriageNumber> {
        self.carriages.iter().map(|c| c.number).collect()
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.carriages.iter().map(|c| c.number.to_string()).collect();
        let sizes: Vec<String> = self.carriages.iter().map(|c| c.seats.to_string()).collect();
        let noun = if numbers.len() == 1 { "Carriage" } else { "Carriages" };
        write!(
            f,
            "{} {} on the {} train, group size {}",
            noun,
            numbers.join(", "),
            self.departure,
            sizes.join(" + ")
        )?;

        let mut extras = Vec::new();
        if self.has_wheelchair() {
            extras.push("wheelchair".to_string());
        }
        let toddlers = self.toddlers();
        if toddlers > 0 {
            extras.push(format!("{} toddler(s)", toddlers));
        }
        if !extras.is_empty() {
            write!(f, " ({})", extras.join(", "))?;
        }
        Ok(())
    }
}
