//! Allocation configuration.

use chrono::Duration;

/// Tunable parameters for group allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationConfig {
    /// Trains leaving within this many minutes need operator confirmation.
    pub warning_threshold_mins: i64,

    /// Keep 3-4 person groups out of carriages 1, 4, 5 and 8 during the
    /// contiguous-run search.
    pub restrict_1_4_5_8_for_medium_groups: bool,
}

impl AllocationConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(warning_threshold_mins: i64, restrict_1_4_5_8_for_medium_groups: bool) -> Self {
        Self {
            warning_threshold_mins,
            restrict_1_4_5_8_for_medium_groups,
        }
    }

    /// Returns the warning threshold as a Duration.
    pub fn warning_threshold(&self) -> Duration {
        Duration::minutes(self.warning_threshold_mins)
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            warning_threshold_mins: 10,
            restrict_1_4_5_8_for_medium_groups: false,
        }
    }
}
