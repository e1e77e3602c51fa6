//! The daily schedule: one entry per minute of the day.
//!
//! The UI layer edits it through [`ScheduleStore`]; the scheduler only reads a
//! shared copy.

mod defaults;
mod store;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::daily::FiredSet;
use crate::types::{ScheduleEntry, TimeOfDay};

pub use defaults::default_schedule;
pub use store::ScheduleStore;

/// Time-of-day → entry, kept in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: BTreeMap<TimeOfDay, ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: TimeOfDay) -> Option<&ScheduleEntry> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: TimeOfDay) -> bool {
        self.entries.contains_key(&key)
    }

    /// Inserts or replaces, returning the previous entry.
    pub fn insert(&mut self, key: TimeOfDay, entry: ScheduleEntry) -> Option<ScheduleEntry> {
        self.entries.insert(key, entry)
    }

    pub fn remove(&mut self, key: TimeOfDay) -> Option<ScheduleEntry> {
        self.entries.remove(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeOfDay, &ScheduleEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest entry strictly after `now` that has not fired today.
    /// `None` means every remaining alert already fired.
    pub fn next_upcoming(
        &self,
        fired: &FiredSet,
        now: TimeOfDay,
        today: NaiveDate,
    ) -> Option<(TimeOfDay, &ScheduleEntry)> {
        use std::ops::Bound::{Excluded, Unbounded};

        self.entries
            .range((Excluded(now), Unbounded))
            .map(|(k, v)| (*k, v))
            .find(|(k, _)| !fired.contains(*k, today))
    }
}

impl FromIterator<(TimeOfDay, ScheduleEntry)> for Schedule {
    fn from_iter<I: IntoIterator<Item = (TimeOfDay, ScheduleEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
