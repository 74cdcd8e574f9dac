//! Departure time handling.
//!
//! The timetable is a single recurring daily schedule, so a departure is a
//! bare time of day ("HH:MM"). It is placed on a calendar date only when it
//! is compared against the current wall-clock time.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// The time of day a train leaves the station.
///
/// Departure times order the schedule and are unique within it, so they
/// double as the identity of a train.
///
/// # Examples
///
/// ```
/// use train_seating::domain::DepartureTime;
///
/// let time = DepartureTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(time.to_string(), "14:30");
/// assert_eq!(time.to_12_hour(), "2:30 PM");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepartureTime(NaiveTime);

impl DepartureTime {
    /// Create a departure time from a `NaiveTime`, dropping seconds.
    pub fn new(time: NaiveTime) -> Self {
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }

    /// Parse a departure time from strict "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use train_seating::domain::DepartureTime;
    ///
    /// assert!(DepartureTime::parse_hhmm("00:00").is_ok());
    /// assert!(DepartureTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(DepartureTime::parse_hhmm("1430").is_err());
    /// assert!(DepartureTime::parse_hhmm("9:30").is_err());
    /// assert!(DepartureTime::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self(time))
    }

    /// Returns the time of day.
    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Place this departure on the same calendar day as `now`.
    pub fn on_day_of(&self, now: NaiveDateTime) -> NaiveDateTime {
        now.date().and_time(self.0)
    }

    /// Whole minutes from `now` until departure, rounded up.
    ///
    /// Negative once the train has left. A train up to 59 seconds past its
    /// departure time still reports 0.
    pub fn minutes_from(&self, now: NaiveDateTime) -> i64 {
        let secs = self.on_day_of(now).signed_duration_since(now).num_seconds();
        (secs + 59).div_euclid(60)
    }

    /// Render as a 12-hour clock time, e.g. "9:05 AM".
    pub fn to_12_hour(&self) -> String {
        let (pm, hour) = self.0.hour12();
        let suffix = if pm { "PM" } else { "AM" };
        format!("{}:{:02} {}", hour, self.minute(), suffix)
    }
}

impl fmt::Debug for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepartureTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for DepartureTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s.trim())
    }
}

impl Serialize for DepartureTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DepartureTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
