//! A single scheduled departure and its carriages.

use serde::{Deserialize, Serialize};

use super::carriage::{Carriage, CarriageNumber};
use super::error::DomainError;
use super::group::GroupId;
use super::time::DepartureTime;

/// Seat counts for a newly added train, by carriage number.
pub const STANDARD_LAYOUT: [u32; CarriageNumber::PER_TRAIN] = [2, 4, 4, 2, 2, 4, 4, 2];

/// One departure of the sightseeing train.
///
/// A train always has exactly eight carriages numbered 1 to 8 in physical
/// order. Only trains that are not cancelled, not a party service and not
/// reserved for a school take public bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TrainRecord")]
pub struct Train {
    departure: DepartureTime,
    cancelled: bool,
    party_train: bool,
    school_name: String,
    carriages: Vec<Carriage>,
}

#[derive(Deserialize)]
struct TrainRecord {
    departure: DepartureTime,
    #[serde(default)]
    cancelled: bool,
    #[serde(default)]
    party_train: bool,
    #[serde(default)]
    school_name: String,
    carriages: Vec<Carriage>,
}

impl TryFrom<TrainRecord> for Train {
    type Error = DomainError;

    fn try_from(r: TrainRecord) -> Result<Self, Self::Error> {
        let mut train = Train::new(r.departure, r.carriages)?;
        train.cancelled = r.cancelled;
        train.party_train = r.party_train;
        train.set_school_name(&r.school_name);
        Ok(train)
    }
}

impl Train {
    /// Create a train from its carriages, which must be numbered 1-8 in order.
    pub fn new(departure: DepartureTime, carriages: Vec<Carriage>) -> Result<Self, DomainError> {
        if carriages.len() != CarriageNumber::PER_TRAIN {
            return Err(DomainError::CarriageLayout("expected 8 carriages"));
        }
        let in_order = carriages
            .iter()
            .zip(CarriageNumber::all())
            .all(|(c, n)| c.number() == n);
        if !in_order {
            return Err(DomainError::CarriageLayout(
                "carriages must be numbered 1-8 in order",
            ));
        }
        Ok(Self {
            departure,
            cancelled: false,
            party_train: false,
            school_name: String::new(),
            carriages,
        })
    }

    /// Create an empty train with the given seat counts for carriages 1-8.
    pub fn with_capacities(
        departure: DepartureTime,
        capacities: [u32; CarriageNumber::PER_TRAIN],
    ) -> Result<Self, DomainError> {
        let carriages = CarriageNumber::all()
            .zip(capacities)
            .map(|(n, cap)| Carriage::new(n, cap))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(departure, carriages)
    }

    /// Create an empty train with the standard layout.
    pub fn standard(departure: DepartureTime) -> Self {
        let carriages = CarriageNumber::all()
            .zip(STANDARD_LAYOUT)
            .filter_map(|(n, cap)| Carriage::new(n, cap).ok())
            .collect();
        Self {
            departure,
            cancelled: false,
            party_train: false,
            school_name: String::new(),
            carriages,
        }
    }

    pub fn departure(&self) -> DepartureTime {
        self.departure
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_party_train(&self) -> bool {
        self.party_train
    }

    /// Empty when the train is not a school service.
    pub fn school_name(&self) -> &str {
        &self.school_name
    }

    pub fn is_school_train(&self) -> bool {
        !self.school_name.is_empty()
    }

    /// Whether the train is open to walk-up groups at all.
    pub fn accepts_public_bookings(&self) -> bool {
        !self.cancelled && !self.party_train && !self.is_school_train()
    }

    /// Carriages in physical order.
    pub fn carriages(&self) -> &[Carriage] {
        &self.carriages
    }

    pub fn carriage(&self, number: CarriageNumber) -> &Carriage {
        &self.carriages[number.get() as usize - 1]
    }

    pub(crate) fn carriage_mut(&mut self, number: CarriageNumber) -> &mut Carriage {
        &mut self.carriages[number.get() as usize - 1]
    }

    pub fn free_carriages(&self) -> impl Iterator<Item = &Carriage> {
        self.carriages.iter().filter(|c| !c.is_occupied())
    }

    pub fn has_free_carriage(&self) -> bool {
        self.free_carriages().next().is_some()
    }

    /// Seats in carriages nobody has claimed.
    pub fn free_seats(&self) -> u32 {
        self.free_carriages().map(Carriage::capacity).sum()
    }

    pub fn booked_seats(&self) -> u32 {
        self.carriages.iter().map(Carriage::group_size).sum()
    }

    /// Distinct groups aboard, in carriage order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = Vec::new();
        for id in self.carriages.iter().filter_map(Carriage::group_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    pub fn set_party_train(&mut self, party_train: bool) {
        self.party_train = party_train;
    }

    /// Mark as a school service; an empty or blank name clears it.
    pub fn set_school_name(&mut self, name: &str) {
        self.school_name = name.trim().to_string();
    }

    pub(crate) fn set_departure(&mut self, departure: DepartureTime) {
        self.departure = departure;
    }

    /// Release every carriage held by `group_id`, returning how many.
    pub(crate) fn release_group(&mut self, group_id: GroupId) -> usize {
        let mut released = 0;
        for carriage in &mut self.carriages {
            if carriage.group_id() == Some(group_id) {
                carriage.release();
                released += 1;
            }
        }
        released
    }
}
