//! "Only this pair is left" predicates.
//!
//! Carriages 4/5 sit in the middle of the train and 1/8 at the ends. When a
//! 3-4 person group's only option is to split across one of these pairs,
//! the operator is asked before the booking goes ahead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Carriage, CarriageNumber};

/// A pair of carriages a medium group may be split across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarriagePair {
    /// Carriages 4 and 5.
    FourFive,
    /// Carriages 1 and 8.
    OneEight,
}

impl CarriagePair {
    pub fn numbers(self) -> [u8; 2] {
        match self {
            CarriagePair::FourFive => [4, 5],
            CarriagePair::OneEight => [1, 8],
        }
    }

    pub fn contains(self, number: CarriageNumber) -> bool {
        self.numbers().contains(&number.get())
    }

    /// The pair as carriage numbers.
    pub fn carriage_numbers(self) -> Vec<CarriageNumber> {
        self.numbers()
            .into_iter()
            .filter_map(|n| CarriageNumber::new(n).ok())
            .collect()
    }
}

impl fmt::Display for CarriagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.numbers();
        write!(f, "{} and {}", a, b)
    }
}

/// True iff the free members of `pair` can seat `size` between them and no
/// other free carriage can seat the group on its own.
pub fn only_pair_available(carriages: &[Carriage], size: u32, pair: CarriagePair) -> bool {
    let pair_capacity: u32 = pair
        .numbers()
        .into_iter()
        .filter_map(|n| {
            carriages
                .iter()
                .find(|c| c.number().get() == n && !c.is_occupied())
        })
        .map(Carriage::capacity)
        .sum();

    if pair_capacity < size {
        return false;
    }

    !carriages
        .iter()
        .filter(|c| !pair.contains(c.number()))
        .any(|c| c.fits(size))
}

pub fn only_c4_c5_available(carriages: &[Carriage], size: u32) -> bool {
    only_pair_available(carriages, size, CarriagePair::FourFive)
}

pub fn only_c1_c8_available(carriages: &[Carriage], size: u32) -> bool {
    only_pair_available(carriages, size, CarriagePair::OneEight)
}

/// The pair that is a train's sole option for `size`, checking 4/5 first.
pub fn sole_pair_option(carriages: &[Carriage], size: u32) -> Option<CarriagePair> {
    [CarriagePair::FourFive, CarriagePair::OneEight]
        .into_iter()
        .find(|&pair| only_pair_available(carriages, size, pair))
}
