//! File-backed schedule with the add / edit / delete operations the UI uses.
//!
//! Stored as a plain map in `schedule.json`:
//!
//! ```json
//! { "05:00": { "titulo": "...", "periodo": "MORNING", "cor": "#FF6B35", "tarefas": ["..."] } }
//! ```
//!
//! A missing or unreadable file falls back to [`default_schedule`]. The file is
//! only written on the first edit. An unreadable file is moved aside to
//! `schedule.json.bak` before that first write.

use std::path::{Path, PathBuf};

use fs_err as fs;

use super::{default_schedule, Schedule};
use crate::error::{AgendaError, Result};
use crate::fs_util::{read_json, write_json_atomic};
use crate::types::{ScheduleEntry, TimeOfDay};

pub struct ScheduleStore {
    schedule: Schedule,
    file_path: Option<PathBuf>,
    /// The file exists but could not be read. It is backed up on first save.
    unreadable: bool,
}

impl ScheduleStore {
    pub fn new_in_memory(schedule: Schedule) -> Self {
        Self {
            schedule,
            file_path: None,
            unreadable: false,
        }
    }

    pub fn load(file_path: &Path) -> Self {
        let (schedule, unreadable) = match read_json::<Schedule>(file_path) {
            Some(schedule) => (schedule, false),
            None if file_path.exists() => {
                tracing::warn!(
                    path = %file_path.display(),
                    "Unreadable schedule, using default routine until the next edit"
                );
                (default_schedule(), true)
            }
            None => {
                tracing::debug!(path = %file_path.display(), "No saved schedule, using default routine");
                (default_schedule(), false)
            }
        };
        Self {
            schedule,
            file_path: Some(file_path.to_path_buf()),
            unreadable,
        }
    }

    /// True when the backing file exists but did not parse.
    pub fn is_unreadable(&self) -> bool {
        self.unreadable
    }

    pub fn save(&mut self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if self.unreadable {
            let backup = backup_path(path);
            fs::rename(path, &backup)?;
            tracing::warn!(backup = %backup.display(), "Moved unreadable schedule aside");
            self.unreadable = false;
        }
        write_json_atomic(path, &self.schedule)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Adds a new entry. An existing entry at `key` is only replaced when
    /// `replace` is set, otherwise the call fails with `Conflict`.
    pub fn add(&mut self, key: TimeOfDay, entry: ScheduleEntry, replace: bool) -> Result<()> {
        let entry = entry.validated()?;
        if self.schedule.contains(key) && !replace {
            return Err(AgendaError::Conflict(key));
        }
        self.schedule.insert(key, entry);
        tracing::info!(key = %key, replace, "Task added");
        Ok(())
    }

    /// Updates the entry at `original`, moving it to `new_key` if the time
    /// changed. Whatever sat at `new_key` is overwritten.
    pub fn edit(
        &mut self,
        original: TimeOfDay,
        new_key: TimeOfDay,
        entry: ScheduleEntry,
    ) -> Result<()> {
        if !self.schedule.contains(original) {
            return Err(AgendaError::NotFound(original));
        }
        let entry = entry.validated()?;
        if original != new_key {
            self.schedule.remove(original);
        }
        self.schedule.insert(new_key, entry);
        tracing::info!(from = %original, to = %new_key, "Task edited");
        Ok(())
    }

    pub fn delete(&mut self, key: TimeOfDay) -> Result<ScheduleEntry> {
        let removed = self
            .schedule
            .remove(key)
            .ok_or(AgendaError::NotFound(key))?;
        tracing::info!(key = %key, "Task deleted");
        Ok(removed)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
