use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{is_current, load_for_day, DatedRecord};
use crate::error::Result;
use crate::fs_util::write_json_atomic;
use crate::types::TimeOfDay;

#[derive(Debug, Serialize, Deserialize)]
struct FiredFile {
    #[serde(rename = "data")]
    date: NaiveDate,
    #[serde(rename = "alertas", default)]
    alerts: Vec<TimeOfDay>,
}

impl DatedRecord for FiredFile {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Keys whose alert has already been shown on `date`.
///
/// Create with [`FiredSet::load`] to read from disk, or
/// [`FiredSet::new_in_memory`] for tests.
#[derive(Debug, Clone)]
pub struct FiredSet {
    date: NaiveDate,
    keys: BTreeSet<TimeOfDay>,
    file_path: Option<PathBuf>,
}

impl FiredSet {
    pub fn new_in_memory(today: NaiveDate) -> Self {
        Self {
            date: today,
            keys: BTreeSet::new(),
            file_path: None,
        }
    }

    pub fn new(file_path: &Path, today: NaiveDate) -> Self {
        Self {
            file_path: Some(file_path.to_path_buf()),
            ..Self::new_in_memory(today)
        }
    }

    /// Never fails: missing, corrupt or stale files start the day empty.
    pub fn load(file_path: &Path, today: NaiveDate) -> Self {
        match load_for_day::<FiredFile>(file_path, today) {
            Some(file) => Self {
                date: file.date,
                keys: file.alerts.into_iter().collect(),
                file_path: Some(file_path.to_path_buf()),
            },
            None => Self::new(file_path, today),
        }
    }

    /// Writes `{date, keys}` atomically. In-memory sets are a no-op.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let file = FiredFile {
            date: self.date,
            alerts: self.keys.iter().copied().collect(),
        };
        write_json_atomic(path, &file)
    }

    pub fn contains(&self, key: TimeOfDay, today: NaiveDate) -> bool {
        is_current(self.date, today) && self.keys.contains(&key)
    }

    /// Records `key` for `today`. Returns false if it was already there.
    pub fn insert(&mut self, key: TimeOfDay, today: NaiveDate) -> bool {
        self.roll_over(today);
        self.keys.insert(key)
    }

    pub fn clear(&mut self, today: NaiveDate) {
        self.date = today;
        self.keys.clear();
    }

    /// Keys fired today, in chronological order.
    pub fn keys(&self, today: NaiveDate) -> Vec<TimeOfDay> {
        if is_current(self.date, today) {
            self.keys.iter().copied().collect()
        } else {
            Vec::new()
        }
    }

    pub fn is_empty(&self, today: NaiveDate) -> bool {
        self.keys(today).is_empty()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if !is_current(self.date, today) {
            tracing::info!(previous = %self.date, today = %today, "New day, fired alerts reset");
            self.clear(today);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_err as fs;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn key(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = FiredSet::new_in_memory(day(19));
        assert!(set.insert(key("05:00"), day(19)));
        assert!(!set.insert(key("05:00"), day(19)));
        assert!(set.contains(key("05:00"), day(19)));
        assert!(!set.contains(key("07:00"), day(19)));
    }

    #[test]
    fn test_stale_set_reads_as_empty() {
        let mut set = FiredSet::new_in_memory(day(19));
        set.insert(key("05:00"), day(19));
        assert!(!set.contains(key("05:00"), day(20)));
        assert!(set.is_empty(day(20)));
    }

    #[test]
    fn test_insert_on_new_day_drops_old_keys() {
        let mut set = FiredSet::new_in_memory(day(19));
        set.insert(key("05:00"), day(19));
        set.insert(key("07:00"), day(20));
        assert_eq!(set.keys(day(20)), vec![key("07:00")]);
        assert_eq!(set.date(), day(20));
    }

    #[test]
    fn test_persistence_round_trip_same_day() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("fired.json");

        let mut set = FiredSet::new(&file, day(19));
        set.insert(key("07:00"), day(19));
        set.insert(key("05:00"), day(19));
        set.save().unwrap();

        let loaded = FiredSet::load(&file, day(19));
        assert_eq!(loaded.keys(day(19)), vec![key("05:00"), key("07:00")]);
    }

    #[test]
    fn test_load_on_other_day_is_empty() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("fired.json");

        let mut set = FiredSet::new(&file, day(19));
        set.insert(key("05:00"), day(19));
        set.save().unwrap();

        let loaded = FiredSet::load(&file, day(20));
        assert!(loaded.is_empty(day(20)));
        assert_eq!(loaded.date(), day(20));
    }

    #[test]
    fn test_on_disk_format() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("fired.json");

        let mut set = FiredSet::new(&file, day(19));
        set.insert(key("05:00"), day(19));
        set.save().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(raw["data"], "2026-10-19");
        assert_eq!(raw["alertas"], serde_json::json!(["05:00"]));
    }

    #[test]
    fn test_reads_file_written_by_hand() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("fired.json");
        fs::write(&file, r#"{"data": "2026-10-19", "alertas": ["08:00", "05:00"]}"#).unwrap();

        let loaded = FiredSet::load(&file, day(19));
        assert_eq!(loaded.keys(day(19)), vec![key("05:00"), key("08:00")]);
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("fired.json");
        fs::write(&file, "{\"data\": \"2026-10-19\", \"alertas\": [").unwrap();

        let loaded = FiredSet::load(&file, day(19));
        assert!(loaded.is_empty(day(19)));
    }
}
