//! Storage root and file layout.
//!
//! Everything Agenda persists lives under one directory, `~/.agenda` by
//! default. Tests and the `--data-dir` flag point it somewhere else.
//!
//! ```text
//! ~/.agenda/
//!   config.json            secret, poll and cue intervals
//!   schedule.json          HH:MM -> entry
//!   fired-alerts.json      {"data": date, "alertas": [...]}
//!   completions.json       {"data": date, "conclusoes": {...}}
//!   shopping-list.json     category -> items
//!   shopping-checked.json  ["category|item", ...]
//!   agenda.{date}.log      rotated daily by the binary
//! ```

use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::{AgendaError, Result};

/// Environment variable that overrides the storage root.
pub const HOME_ENV: &str = "AGENDA_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$AGENDA_HOME` if set, otherwise `~/.agenda`.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }
        Self::default_root().map(Self::new).ok_or(AgendaError::NoHomeDir)
    }

    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".agenda"))
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn schedule_file(&self) -> PathBuf {
        self.root.join("schedule.json")
    }

    pub fn fired_file(&self) -> PathBuf {
        self.root.join("fired-alerts.json")
    }

    pub fn completions_file(&self) -> PathBuf {
        self.root.join("completions.json")
    }

    pub fn shopping_list_file(&self) -> PathBuf {
        self.root.join("shopping-list.json")
    }

    pub fn shopping_checked_file(&self) -> PathBuf {
        self.root.join("shopping-checked.json")
    }
}
