use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{is_current, load_for_day, DatedRecord};
use crate::error::Result;
use crate::fs_util::write_json_atomic;
use crate::types::TimeOfDay;

#[derive(Debug, Serialize, Deserialize)]
struct CompletionFile {
    #[serde(rename = "data")]
    date: NaiveDate,
    #[serde(rename = "conclusoes", default)]
    done: BTreeMap<TimeOfDay, bool>,
}

impl DatedRecord for CompletionFile {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Tasks the user marked done on `date`.
#[derive(Debug, Clone)]
pub struct CompletionSet {
    date: NaiveDate,
    done: BTreeMap<TimeOfDay, bool>,
    file_path: Option<PathBuf>,
}

impl CompletionSet {
    pub fn new_in_memory(today: NaiveDate) -> Self {
        Self {
            date: today,
            done: BTreeMap::new(),
            file_path: None,
        }
    }

    pub fn new(file_path: &Path, today: NaiveDate) -> Self {
        Self {
            file_path: Some(file_path.to_path_buf()),
            ..Self::new_in_memory(today)
        }
    }

    pub fn load(file_path: &Path, today: NaiveDate) -> Self {
        match load_for_day::<CompletionFile>(file_path, today) {
            Some(file) => Self {
                date: file.date,
                done: file.done,
                file_path: Some(file_path.to_path_buf()),
            },
            None => Self::new(file_path, today),
        }
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let file = CompletionFile {
            date: self.date,
            done: self.done.clone(),
        };
        write_json_atomic(path, &file)
    }

    pub fn is_done(&self, key: TimeOfDay, today: NaiveDate) -> bool {
        is_current(self.date, today) && self.done.get(&key).copied().unwrap_or(false)
    }

    pub fn set_done(&mut self, key: TimeOfDay, done: bool, today: NaiveDate) {
        if !is_current(self.date, today) {
            self.reset(today);
        }
        self.done.insert(key, done);
    }

    /// Flips `key` and returns the new value.
    pub fn toggle(&mut self, key: TimeOfDay, today: NaiveDate) -> bool {
        let done = !self.is_done(key, today);
        self.set_done(key, done, today);
        done
    }

    pub fn reset(&mut self, today: NaiveDate) {
        self.date = today;
        self.done.clear();
    }

    pub fn done_count(&self, today: NaiveDate) -> usize {
        if !is_current(self.date, today) {
            return 0;
        }
        self.done.values().filter(|d| **d).count()
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
    fn test_toggle_flips_status() {
        let mut set = CompletionSet::new_in_memory(day(19));
        assert!(set.toggle(key("05:00"), day(19)));
        assert!(set.is_done(key("05:00"), day(19)));
        assert!(!set.toggle(key("05:00"), day(19)));
        assert!(!set.is_done(key("05:00"), day(19)));
    }

    #[test]
    fn test_done_count_ignores_false_entries() {
        let mut set = CompletionSet::new_in_memory(day(19));
        set.set_done(key("05:00"), true, day(19));
        set.set_done(key("07:00"), false, day(19));
        assert_eq!(set.done_count(day(19)), 1);
        assert_eq!(set.done_count(day(20)), 0);
    }

    #[test]
    fn test_round_trip_and_rollover() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("done.json");

        let mut set = CompletionSet::new(&file, day(19));
        set.set_done(key("07:00"), true, day(19));
        set.save().unwrap();

        assert!(CompletionSet::load(&file, day(19)).is_done(key("07:00"), day(19)));
        assert!(!CompletionSet::load(&file, day(20)).is_done(key("07:00"), day(20)));
    }

    #[test]
    fn test_on_disk_format() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("done.json");

        let mut set = CompletionSet::new(&file, day(19));
        set.set_done(key("05:00"), true, day(19));
        set.save().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(raw["data"], "2026-10-19");
        assert_eq!(raw["conclusoes"]["05:00"], true);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut set = CompletionSet::new_in_memory(day(19));
        set.set_done(key("05:00"), true, day(19));
        set.reset(day(19));
        assert_eq!(set.done_count(day(19)), 0);
    }
}
