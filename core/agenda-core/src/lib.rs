//! Core library for Agenda, a daily reminder with password-gated alerts.
//!
//! - [`schedule`]: the daily routine, one entry per minute of the day
//! - [`daily`]: fired alerts and completed tasks, valid for one calendar day
//! - [`scheduler`]: background poller that fires each entry once per day
//! - [`alert`]: the alert state machine and its repeating cue
//! - [`context`]: shared state handed to all of the above
//!
//! The front end (window toolkit, tray, audio backend) plugs in through
//! [`alert::AlertWindow`], [`alert::CuePlayer`] and the channel the scheduler
//! posts [`types::FireEvent`]s into.

pub mod alert;
pub mod clock;
pub mod config;
pub mod context;
pub mod daily;
pub mod error;
mod fs_util;
pub mod schedule;
pub mod scheduler;
pub mod shopping;
pub mod storage;
pub mod types;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_support;

pub use clock::{Clock, SystemClock};
pub use config::AgendaConfig;
pub use context::AppContext;
pub use error::{AgendaError, Result};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use storage::StorageConfig;
pub use types::{AlertSnapshot, FireEvent, ScheduleEntry, TimeOfDay};
