//! Schedule store backed by JSON files in one directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::Schedule;

use super::ScheduleStore;
use super::error::StoreError;
use super::preset::{PresetBook, PresetName, PresetSummary};

const SCHEDULE_FILE: &str = "schedule.json";
const PRESETS_FILE: &str = "presets.json";

/// Keeps `schedule.json` and `presets.json` under a data directory.
///
/// Missing files read as empty. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn schedule_path(&self) -> PathBuf {
        self.dir.join(SCHEDULE_FILE)
    }

    fn presets_path(&self) -> PathBuf {
        self.dir.join(PRESETS_FILE)
    }

    fn read_presets(&self) -> Result<PresetBook, StoreError> {
        read_json(&self.presets_path())
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(StoreError::Io {
                message: format!("failed to read {}: {}", path.display(), e),
            });
        }
    };

    serde_json::from_str(&contents).map_err(|e| StoreError::Json {
        message: format!("{}: {}", path.display(), e),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            message: format!("failed to create data directory: {}", e),
        })?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Json {
        message: format!("failed to serialize: {}", e),
    })?;

    std::fs::write(path, json).map_err(|e| StoreError::Io {
        message: format!("failed to write {}: {}", path.display(), e),
    })?;

    debug!(path = %path.display(), "wrote store file");
    Ok(())
}

impl ScheduleStore for JsonFileStore {
    fn load(&self) -> Result<Schedule, StoreError> {
        read_json(&self.schedule_path())
    }

    fn replace(&mut self, schedule: &Schedule) -> Result<(), StoreError> {
        write_json(&self.schedule_path(), schedule)
    }

    fn list_presets(&self) -> Result<Vec<PresetSummary>, StoreError> {
        Ok(self.read_presets()?.summaries())
    }

    fn save_preset(
        &mut self,
        name: &PresetName,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut book = self.read_presets()?;
        book.save(name, schedule, now);
        write_json(&self.presets_path(), &book)
    }

    fn load_preset(&self, name: &PresetName) -> Result<Schedule, StoreError> {
        self.read_presets()?.get(name).cloned()
    }

    fn delete_preset(&mut self, name: &PresetName) -> Result<bool, StoreError> {
        let mut book = self.read_presets()?;
        if !book.remove(name) {
            return Ok(false);
        }
        write_json(&self.presets_path(), &book)?;
        Ok(true)
    }
}
