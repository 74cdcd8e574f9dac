//! Named snapshots of a schedule.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Schedule;

use super::error::StoreError;

/// A preset name: trimmed, never blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PresetName(String);

impl PresetName {
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StoreError::InvalidName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PresetName {
    type Error = StoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PresetName> for String {
    fn from(name: PresetName) -> Self {
        name.0
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a preset listing shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetSummary {
    pub name: PresetName,
    pub saved_at: DateTime<Utc>,
    pub trains: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredPreset {
    name: PresetName,
    saved_at: DateTime<Utc>,
    schedule: Schedule,
}

/// Every saved preset. Shared by the store implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct PresetBook {
    presets: Vec<StoredPreset>,
}

impl PresetBook {
    /// Save under `name`, replacing any preset already called that.
    pub(crate) fn save(&mut self, name: &PresetName, schedule: &Schedule, now: DateTime<Utc>) {
        match self.presets.iter_mut().find(|p| &p.name == name) {
            Some(existing) => {
                existing.schedule = schedule.clone();
                existing.saved_at = now;
            }
            None => self.presets.push(StoredPreset {
                name: name.clone(),
                saved_at: now,
                schedule: schedule.clone(),
            }),
        }
    }

    /// Newest first.
    pub(crate) fn summaries(&self) -> Vec<PresetSummary> {
        let mut summaries: Vec<PresetSummary> = self
            .presets
            .iter()
            .map(|p| PresetSummary {
                name: p.name.clone(),
                saved_at: p.saved_at,
                trains: p.schedule.len(),
            })
            .collect();
        summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        summaries
    }

    pub(crate) fn get(&self, name: &PresetName) -> Result<&Schedule, StoreError> {
        self.presets
            .iter()
            .find(|p| &p.name == name)
            .map(|p| &p.schedule)
            .ok_or_else(|| StoreError::MissingPreset(name.to_string()))
    }

    pub(crate) fn remove(&mut self, name: &PresetName) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| &p.name != name);
        self.presets.len() != before
    }
}
