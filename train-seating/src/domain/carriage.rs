//! Carriage types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::group::GroupId;

/// Error returned when a carriage number is outside 1-8.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid carriage number: {reason}")]
pub struct InvalidCarriageNumber {
    reason: &'static str,
}

/// The fixed position of a carriage within its train, 1 to 8.
///
/// Numbers never change once a train is built, and carriage 2 is the only
/// one that can take a wheelchair.
///
/// # Examples
///
/// ```
/// use train_seating::domain::CarriageNumber;
///
/// let two = CarriageNumber::new(2).unwrap();
/// assert!(two.is_wheelchair_accessible());
///
/// assert!(CarriageNumber::new(0).is_err());
/// assert!(CarriageNumber::new(9).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CarriageNumber(u8);

impl CarriageNumber {
    /// Number of carriages in every train.
    pub const PER_TRAIN: usize = 8;

    /// The wheelchair-accessible carriage.
    pub const WHEELCHAIR: CarriageNumber = CarriageNumber(2);

    pub fn new(n: u8) -> Result<Self, InvalidCarriageNumber> {
        if n == 0 || n as usize > Self::PER_TRAIN {
            return Err(InvalidCarriageNumber {
                reason: "must be between 1 and 8",
            });
        }
        Ok(CarriageNumber(n))
    }

    /// All carriage numbers in physical order.
    pub fn all() -> impl Iterator<Item = CarriageNumber> {
        (1..=Self::PER_TRAIN as u8).map(CarriageNumber)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_wheelchair_accessible(self) -> bool {
        self == Self::WHEELCHAIR
    }
}

impl TryFrom<u8> for CarriageNumber {
    type Error = InvalidCarriageNumber;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<CarriageNumber> for u8 {
    fn from(n: CarriageNumber) -> u8 {
        n.0
    }
}

impl fmt::Debug for CarriageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl fmt::Display for CarriageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One seating unit aboard a train.
///
/// A carriage is either free or claimed by exactly one group. Occupancy is
/// derived from the seat count, and the group id is present iff seats are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CarriageRecord")]
pub struct Carriage {
    number: CarriageNumber,
    capacity: u32,
    group_size: u32,
    toddlers: u32,
    wheelchair: bool,
    group_id: Option<GroupId>,
}

/// Unvalidated carriage as it appears in stored schedules.
#[derive(Deserialize)]
struct CarriageRecord {
    number: CarriageNumber,
    capacity: u32,
    #[serde(default)]
    group_size: u32,
    #[serde(default)]
    toddlers: u32,
    #[serde(default)]
    wheelchair: bool,
    #[serde(default)]
    group_id: Option<GroupId>,
}

impl TryFrom<CarriageRecord> for Carriage {
    type Error = DomainError;

    fn try_from(r: CarriageRecord) -> Result<Self, Self::Error> {
        let mut carriage = Carriage::new(r.number, r.capacity)?;
        match (r.group_id, r.group_size) {
            (None, 0) => Ok(carriage),
            (Some(id), seats) if seats > 0 => {
                carriage.assign(id, seats, r.toddlers, r.wheelchair)?;
                Ok(carriage)
            }
            _ => Err(DomainError::GroupMismatch(r.number)),
        }
    }
}

impl Carriage {
    /// Seats usable in a carriage that holds a wheelchair.
    pub const WHEELCHAIR_SEATS: u32 = 3;

    /// Create an empty carriage.
    pub fn new(number: CarriageNumber, capacity: u32) -> Result<Self, DomainError> {
        if capacity == 0 {
            return Err(DomainError::ZeroCapacity(number));
        }
        Ok(Self {
            number,
            capacity,
            group_size: 0,
            toddlers: 0,
            wheelchair: false,
            group_id: None,
        })
    }

    pub fn number(&self) -> CarriageNumber {
        self.number
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Seats currently allotted.
    pub fn group_size(&self) -> u32 {
        self.group_size
    }

    /// Lap-sitting toddlers, counted within `group_size`.
    pub fn toddlers(&self) -> u32 {
        self.toddlers
    }

    /// Whether this carriage currently holds a wheelchair user.
    pub fn is_wheelchair(&self) -> bool {
        self.wheelchair
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    pub fn is_occupied(&self) -> bool {
        self.group_size > 0
    }

    /// Usable seats, reduced when the carriage holds a wheelchair.
    pub fn effective_capacity(&self, wheelchair: bool) -> u32 {
        if wheelchair {
            self.capacity.min(Self::WHEELCHAIR_SEATS)
        } else {
            self.capacity
        }
    }

    /// Free and large enough for `seats` people on its own.
    pub fn fits(&self, seats: u32) -> bool {
        !self.is_occupied() && self.capacity >= seats
    }

    /// Claim this carriage for a group.
    pub(crate) fn assign(
        &mut self,
        group_id: GroupId,
        seats: u32,
        toddlers: u32,
        wheelchair: bool,
    ) -> Result<(), DomainError> {
        if self.is_occupied() {
            return Err(DomainError::CarriageOccupied(self.number));
        }
        if wheelchair && !self.number.is_wheelchair_accessible() {
            return Err(DomainError::NotWheelchairAccessible(self.number));
        }
        let capacity = self.effective_capacity(wheelchair);
        if seats == 0 || seats > capacity {
            return Err(DomainError::OverCapacity {
                number: self.number,
                seats,
                capacity,
            });
        }
        if toddlers > seats {
            return Err(DomainError::ToddlersExceedSeats {
                number: self.number,
                toddlers,
                seats,
            });
        }
        self.group_size = seats;
        self.toddlers = toddlers;
        self.wheelchair = wheelchair;
        self.group_id = Some(group_id);
        Ok(())
    }

    /// Return the carriage to the free pool.
    pub(crate) fn release(&mut self) {
        self.group_size = 0;
        self.toddlers = 0;
        self.wheelchair = false;
        self.group_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: u8) -> CarriageNumber {
        CarriageNumber::new(n).unwrap()
    }

    fn gid(n: u32) -> GroupId {
        GroupId::new(n).unwrap()
    }

    #[test]
    fn numbers_in_range() {
        for n in 1..=8 {
            assert!(CarriageNumber::new(n).is_ok());
        }
        assert!(CarriageNumber::new(0).is_err());
        assert!(CarriageNumber::new(9).is_err());
    }

    #[test]
    fn all_is_physical_order() {
        let all: Vec<u8> = CarriageNumber::all().map(CarriageNumber::get).collect();
        assert_eq!(all, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(num(4).to_string(), "4");
        assert_eq!(format!("{:?}", num(4)), "C4");
    }

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(
            Carriage::new(num(1), 0),
            Err(DomainError::ZeroCapacity(num(1)))
        );
    }

    #[test]
    fn assign_and_release() {
        let mut c = Carriage::new(num(3), 4).unwrap();
        assert!(!c.is_occupied());
        assert!(c.fits(4));

        c.assign(gid(7), 3, 1, false).unwrap();
        assert!(c.is_occupied());
        assert_eq!(c.group_size(), 3);
        assert_eq!(c.toddlers(), 1);
        assert_eq!(c.group_id(), Some(gid(7)));
        assert!(!c.fits(1));

        c.release();
        assert!(!c.is_occupied());
        assert_eq!(c.group_id(), None);
        assert_eq!(c.toddlers(), 0);
    }

    #[test]
    fn assign_rejects_invariant_breaks() {
        let mut c = Carriage::new(num(1), 2).unwrap();
        assert!(matches!(
            c.assign(gid(1), 3, 0, false),
            Err(DomainError::OverCapacity { .. })
        ));
        assert!(matches!(
            c.assign(gid(1), 0, 0, false),
            Err(DomainError::OverCapacity { .. })
        ));
        assert!(matches!(
            c.assign(gid(1), 1, 2, false),
            Err(DomainError::ToddlersExceedSeats { .. })
        ));

        c.assign(gid(1), 2, 0, false).unwrap();
        assert_eq!(
            c.assign(gid(2), 1, 0, false),
            Err(DomainError::CarriageOccupied(num(1)))
        );
    }

    #[test]
    fn wheelchair_caps_seats() {
        let mut c = Carriage::new(num(2), 4).unwrap();
        assert_eq!(c.effective_capacity(true), 3);
        assert_eq!(c.effective_capacity(false), 4);
        assert_eq!(
            c.assign(gid(1), 4, 0, true),
            Err(DomainError::OverCapacity {
                number: num(2),
                seats: 4,
                capacity: 3
            })
        );
        c.assign(gid(1), 3, 0, true).unwrap();

        // a small carriage keeps its own limit
        assert_eq!(Carriage::new(num(2), 2).unwrap().effective_capacity(true), 2);
    }

    #[test]
    fn deserialize_validates() {
        let ok: Carriage = serde_json::from_str(
            r#"{"number":2,"capacity":4,"group_size":3,"toddlers":0,"wheelchair":true,"group_id":5}"#,
        )
        .unwrap();
        assert!(ok.is_wheelchair());
        assert_eq!(ok.group_id(), Some(gid(5)));

        let empty: Carriage = serde_json::from_str(r#"{"number":1,"capacity":2}"#).unwrap();
        assert!(!empty.is_occupied());

        // seats without an owner
        assert!(
            serde_json::from_str::<Carriage>(r#"{"number":1,"capacity":2,"group_size":2}"#)
                .is_err()
        );
        // more seats than capacity
        assert!(
            serde_json::from_str::<Carriage>(
                r#"{"number":1,"capacity":2,"group_size":3,"group_id":1}"#
            )
            .is_err()
        );
        assert!(serde_json::from_str::<Carriage>(r#"{"number":9,"capacity":2}"#).is_err());
        // wheelchair outside carriage 2
        assert!(
            serde_json::from_str::<Carriage>(
                r#"{"number":6,"capacity":4,"group_size":3,"wheelchair":true,"group_id":5}"#
            )
            .is_err()
        );
    }

    #[test]
    fn wheelchair_only_in_accessible_carriage() {
        let mut c = Carriage::new(num(6), 4).unwrap();
        assert_eq!(
            c.assign(gid(1), 3, 0, true),
            Err(DomainError::NotWheelchairAccessible(num(6)))
        );
        assert!(!c.is_occupied());
        c.assign(gid(1), 4, 0, false).unwrap();
    }
}
