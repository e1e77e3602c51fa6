//! Configuration loading and saving.
//!
//! `config.json` in the storage root holds the shared secret and timer
//! settings. Reads are best-effort; a missing or malformed file yields
//! defaults so the app stays usable.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fs_util::{read_json, write_json_atomic};
use crate::storage::StorageConfig;

pub const DEFAULT_SECRET: &str = "25798463";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_CUE_INTERVAL_SECS: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AgendaConfig {
    /// Passphrase that closes an open alert.
    pub secret: String,
    /// Seconds between scheduler ticks. Matching is per minute, so anything
    /// at or above 60 is pulled back to the default.
    pub poll_interval_secs: u64,
    /// Seconds between repeated cues while an alert is open.
    pub cue_interval_secs: u64,
    /// Sound played for each cue. `None` goes straight to the fallback tone.
    pub cue_asset: Option<PathBuf>,
    /// Whether alerts start enabled.
    pub alerts_enabled: bool,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            cue_interval_secs: DEFAULT_CUE_INTERVAL_SECS,
            cue_asset: None,
            alerts_enabled: true,
        }
    }
}

impl AgendaConfig {
    pub fn load(storage: &StorageConfig) -> Self {
        read_json::<Self>(&storage.config_file())
            .map(Self::sanitized)
            .unwrap_or_default()
    }

    pub fn save(&self, storage: &StorageConfig) -> Result<()> {
        write_json_atomic(&storage.config_file(), self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn cue_interval(&self) -> Duration {
        Duration::from_secs(self.cue_interval_secs)
    }

    fn sanitized(mut self) -> Self {
        if self.poll_interval_secs == 0 || self.poll_interval_secs >= 60 {
            tracing::warn!(
                poll_interval_secs = self.poll_interval_secs,
                "Poll interval must be between 1 and 59 seconds, using default"
            );
            self.poll_interval_secs = DEFAULT_POLL_INTERVAL_SECS;
        }
        if self.cue_interval_secs == 0 {
            self.cue_interval_secs = DEFAULT_CUE_INTERVAL_SECS;
        }
        if self.secret.is_empty() {
            tracing::warn!("Empty secret in config, using default");
            self.secret = DEFAULT_SECRET.to_string();
        }
        self
    }
}
