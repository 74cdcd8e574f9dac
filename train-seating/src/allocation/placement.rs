//! Seat splits chosen by the selectors, and committing them to a train.
//!
//! Selectors are pure: they look at a train and return a `Placement`. Only
//! the engine commits a placement, and only after every gate has passed.

use serde::Serialize;

use crate::domain::{
    BookedCarriage, Booking, Carriage, CarriageNumber, DomainError, GroupId, GroupRequest, Train,
};

/// One carriage's share of a placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub number: CarriageNumber,
    pub seats: u32,
    pub toddlers: u32,
    pub wheelchair: bool,
}

/// The carriages a group will occupy on one train, and how it is split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Placement {
    seats: Vec<Seat>,
}

impl Placement {
    pub(crate) fn from_seats(seats: Vec<Seat>) -> Self {
        Self { seats }
    }

    /// The whole group, toddlers included, in one carriage.
    pub fn single(carriage: &Carriage, group: &GroupRequest) -> Self {
        Self {
            seats: vec![Seat {
                number: carriage.number(),
                seats: group.group_size(),
                toddlers: group.toddlers,
                wheelchair: false,
            }],
        }
    }

    /// Fill `run` carriage by carriage up to capacity until the group is seated.
    ///
    /// Toddlers go in the first carriage. They only spill into the next one
    /// when the first has fewer seated people than toddlers.
    pub fn fill_run(run: &[&Carriage], group: &GroupRequest) -> Self {
        let mut remaining = group.group_size();
        let mut toddlers = group.toddlers;
        let mut seats = Vec::with_capacity(run.len());

        for carriage in run {
            if remaining == 0 {
                break;
            }
            let assigned = remaining.min(carriage.capacity());
            let laps = toddlers.min(assigned);
            seats.push(Seat {
                number: carriage.number(),
                seats: assigned,
                toddlers: laps,
                wheelchair: false,
            });
            remaining -= assigned;
            toddlers -= laps;
        }

        Self { seats }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn carriage_numbers(&self) -> Vec<CarriageNumber> {
        self.seats.iter().map(|s| s.number).collect()
    }

    pub fn total_seats(&self) -> u32 {
        self.seats.iter().map(|s| s.seats).sum()
    }

    pub fn total_toddlers(&self) -> u32 {
        self.seats.iter().map(|s| s.toddlers).sum()
    }

    /// Write the placement onto `train` under `group_id`.
    ///
    /// Every target carriage is checked before any is touched, so a failed
    /// commit leaves the train unchanged.
    pub fn commit(&self, train: &mut Train, group_id: GroupId) -> Result<Booking, DomainError> {
        let mut seen: Vec<CarriageNumber> = Vec::with_capacity(self.seats.len());
        for seat in &self.seats {
            let carriage = train.carriage(seat.number);
            if carriage.is_occupied() || seen.contains(&seat.number) {
                return Err(DomainError::CarriageOccupied(seat.number));
            }
            if seat.wheelchair && !seat.number.is_wheelchair_accessible() {
                return Err(DomainError::NotWheelchairAccessible(seat.number));
            }
            let capacity = carriage.effective_capacity(seat.wheelchair);
            if seat.seats == 0 || seat.seats > capacity {
                return Err(DomainError::OverCapacity {
                    number: seat.number,
                    seats: seat.seats,
                    capacity,
                });
            }
            if seat.toddlers > seat.seats {
                return Err(DomainError::ToddlersExceedSeats {
                    number: seat.number,
                    toddlers: seat.toddlers,
                    seats: seat.seats,
                });
            }
            seen.push(seat.number);
        }

        for seat in &self.seats {
            train
                .carriage_mut(seat.number)
                .assign(group_id, seat.seats, seat.toddlers, seat.wheelchair)?;
        }

        Ok(Booking {
            group_id,
            departure: train.departure(),
            carriages: self
                .seats
                .iter()
                .map(|s| BookedCarriage {
                    number: s.number,
                    seats: s.seats,
                    toddlers: s.toddlers,
                    wheelchair: s.wheelchair,
                })
                .collect(),
        })
    }
}
