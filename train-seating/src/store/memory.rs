//! In-memory store, for tests and throwaway servers.

use chrono::{DateTime, Utc};

use crate::domain::Schedule;

use super::ScheduleStore;
use super::error::StoreError;
use super::preset::{PresetBook, PresetName, PresetSummary};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    schedule: Schedule,
    presets: PresetBook,
}

impl MemoryStore {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            presets: PresetBook::default(),
        }
    }
}

impl ScheduleStore for MemoryStore {
    fn load(&self) -> Result<Schedule, StoreError> {
        Ok(self.schedule.clone())
    }

    fn replace(&mut self, schedule: &Schedule) -> Result<(), StoreError> {
        self.schedule = schedule.clone();
        Ok(())
    }

    fn list_presets(&self) -> Result<Vec<PresetSummary>, StoreError> {
        Ok(self.presets.summaries())
    }

    fn save_preset(
        &mut self,
        name: &PresetName,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.presets.save(name, schedule, now);
        Ok(())
    }

    fn load_preset(&self, name: &PresetName) -> Result<Schedule, StoreError> {
        self.presets.get(name).cloned()
    }

    fn delete_preset(&mut self, name: &PresetName) -> Result<bool, StoreError> {
        Ok(self.presets.remove(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DepartureTime;

    fn schedule(times: &[&str]) -> Schedule {
        Schedule::standard(times.iter().map(|t| DepartureTime::parse_hhmm(t).unwrap())).unwrap()
    }

    #[test]
    fn starts_with_given_schedule() {
        let store = MemoryStore::new(schedule(&["10:00", "11:00"]));
        assert_eq!(store.load().unwrap().len(), 2);
        assert!(MemoryStore::default().load().unwrap().is_empty());
    }

    #[test]
    fn activate_replaces_live_schedule() {
        let mut store = MemoryStore::new(schedule(&["10:00"]));
        let name = PresetName::parse("Gala day").unwrap();
        store
            .save_preset(&name, &schedule(&["09:00", "09:30", "10:00"]), Utc::now())
            .unwrap();

        let live = store.activate_preset(&name).unwrap();
        assert_eq!(live.len(), 3);
        assert_eq!(store.load().unwrap(), live);
    }

    #[test]
    fn activating_missing_preset_leaves_schedule() {
        let mut store = MemoryStore::new(schedule(&["10:00"]));
        let name = PresetName::parse("Nope").unwrap();
        assert_eq!(
            store.activate_preset(&name),
            Err(StoreError::MissingPreset("Nope".into()))
        );
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
