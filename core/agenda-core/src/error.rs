//! Error type shared by the core library.

use thiserror::Error;

use crate::types::TimeOfDay;

#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Home directory not found")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist temp file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("A task needs at least one item")]
    EmptyEntry,

    #[error("A task already exists at {0}")]
    Conflict(TimeOfDay),

    #[error("No task scheduled at {0}")]
    NotFound(TimeOfDay),

    #[error("'{0}' already exists")]
    Duplicate(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, AgendaError>;
