//! The day's timetable.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::booking::Booking;
use super::error::DomainError;
use super::group::GroupId;
use super::time::DepartureTime;
use super::train::Train;

/// All trains for the day, ordered by departure time.
///
/// No two trains share a departure time. The allocator works on a schedule
/// in memory for the length of one request; loading and saving it belongs
/// to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Train>", into = "Vec<Train>")]
pub struct Schedule {
    trains: Vec<Train>,
}

impl TryFrom<Vec<Train>> for Schedule {
    type Error = DomainError;

    fn try_from(trains: Vec<Train>) -> Result<Self, Self::Error> {
        Schedule::new(trains)
    }
}

impl From<Schedule> for Vec<Train> {
    fn from(schedule: Schedule) -> Self {
        schedule.trains
    }
}

impl Schedule {
    /// Build a schedule, sorting by departure and rejecting duplicate times.
    pub fn new(mut trains: Vec<Train>) -> Result<Self, DomainError> {
        trains.sort_by_key(Train::departure);
        if let Some(dup) = trains
            .windows(2)
            .find(|w| w[0].departure() == w[1].departure())
        {
            return Err(DomainError::DuplicateDeparture(dup[1].departure()));
        }
        Ok(Self { trains })
    }

    /// A schedule of standard-layout trains at the given times.
    pub fn standard(
        departures: impl IntoIterator<Item = DepartureTime>,
    ) -> Result<Self, DomainError> {
        Self::new(departures.into_iter().map(Train::standard).collect())
    }

    /// Trains in departure order.
    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    /// Mutable access that cannot reorder or resize the timetable.
    pub(crate) fn trains_mut(&mut self) -> &mut [Train] {
        &mut self.trains
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    fn position(&self, departure: DepartureTime) -> Result<usize, DomainError> {
        self.trains
            .binary_search_by_key(&departure, Train::departure)
            .map_err(|_| DomainError::UnknownTrain(departure))
    }

    pub fn train(&self, departure: DepartureTime) -> Option<&Train> {
        self.position(departure).ok().map(|i| &self.trains[i])
    }

    /// Add a train, keeping departure order.
    pub fn add_train(&mut self, train: Train) -> Result<(), DomainError> {
        match self
            .trains
            .binary_search_by_key(&train.departure(), Train::departure)
        {
            Ok(_) => Err(DomainError::DuplicateDeparture(train.departure())),
            Err(index) => {
                self.trains.insert(index, train);
                Ok(())
            }
        }
    }

    /// Remove a train and every booking aboard it.
    pub fn remove_train(&mut self, departure: DepartureTime) -> Result<Train, DomainError> {
        let index = self.position(departure)?;
        Ok(self.trains.remove(index))
    }

    /// Move a train to a new departure time, bookings included.
    pub fn retime_train(
        &mut self,
        from: DepartureTime,
        to: DepartureTime,
    ) -> Result<(), DomainError> {
        let index = self.position(from)?;
        if from == to {
            return Ok(());
        }
        if self.train(to).is_some() {
            return Err(DomainError::DuplicateDeparture(to));
        }
        let mut train = self.trains.remove(index);
        train.set_departure(to);
        self.add_train(train)
    }

    /// Change the cancelled, party or school flags of one train.
    pub fn update_train(
        &mut self,
        departure: DepartureTime,
        update: impl FnOnce(&mut Train),
    ) -> Result<&Train, DomainError> {
        let index = self.position(departure)?;
        update(&mut self.trains[index]);
        Ok(&self.trains[index])
    }

    /// Largest group id anywhere in the schedule.
    pub fn max_group_id(&self) -> Option<GroupId> {
        self.trains
            .iter()
            .flat_map(|t| t.carriages())
            .filter_map(|c| c.group_id())
            .max()
    }

    /// The id a new booking should take.
    pub fn next_group_id(&self) -> GroupId {
        self.max_group_id()
            .map(GroupId::next)
            .unwrap_or(GroupId::FIRST)
    }

    /// Look up a committed booking.
    pub fn booking(&self, group_id: GroupId) -> Option<Booking> {
        self.trains
            .iter()
            .find_map(|t| Booking::from_train(t, group_id))
    }

    /// All bookings, in departure then carriage order.
    pub fn bookings(&self) -> Vec<Booking> {
        self.trains
            .iter()
            .flat_map(|t| {
                t.group_ids()
                    .into_iter()
                    .filter_map(move |id| Booking::from_train(t, id))
            })
            .collect()
    }

    /// Free every carriage holding `group_id`, returning how many were released.
    pub fn remove_group(&mut self, group_id: GroupId) -> usize {
        self.trains
            .iter_mut()
            .map(|t| t.release_group(group_id))
            .sum()
    }

    /// Trains that have not yet left as of `now`.
    pub fn upcoming(&self, now: NaiveDateTime) -> impl Iterator<Item = &Train> {
        self.trains
            .iter()
            .filter(move |t| t.departure().minutes_from(now) >= 0)
    }
}
