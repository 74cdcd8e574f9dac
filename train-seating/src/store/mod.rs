//! Persistence for the live schedule and its named presets.
//!
//! The allocator never touches a store. Callers load a [`Schedule`], run
//! the engine on it in memory, and hand the result back with
//! [`ScheduleStore::replace`].

mod error;
mod json;
mod memory;
mod preset;

pub use error::StoreError;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use preset::{PresetName, PresetSummary};

use chrono::{DateTime, Utc};

use crate::domain::Schedule;

/// Somewhere to keep the live schedule and saved presets.
pub trait ScheduleStore: Send {
    /// The live schedule. Empty if nothing has been saved yet.
    fn load(&self) -> Result<Schedule, StoreError>;

    /// Overwrite the live schedule.
    fn replace(&mut self, schedule: &Schedule) -> Result<(), StoreError>;

    /// Saved presets, newest first.
    fn list_presets(&self) -> Result<Vec<PresetSummary>, StoreError>;

    /// Save `schedule` under `name`, replacing a preset of the same name.
    fn save_preset(
        &mut self,
        name: &PresetName,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    fn load_preset(&self, name: &PresetName) -> Result<Schedule, StoreError>;

    /// Returns whether a preset by that name existed.
    fn delete_preset(&mut self, name: &PresetName) -> Result<bool, StoreError>;

    /// Make a preset the live schedule.
    fn activate_preset(&mut self, name: &PresetName) -> Result<Schedule, StoreError> {
        let schedule = self.load_preset(name)?;
        self.replace(&schedule)?;
        Ok(schedule)
    }
}
