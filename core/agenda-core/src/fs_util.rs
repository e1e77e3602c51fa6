//! Small JSON file helpers shared by every store.

use std::io::Write as _;
use std::path::Path;

use fs_err as fs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::Result;

/// Writes content to a file atomically using a temporary file and rename.
/// A crash mid-write leaves either the previous file or the new one.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    write_file_atomic(path, &content)
}

/// Best-effort JSON read.
///
/// Missing file → `None` silently. Empty, unreadable or corrupt file →
/// `None` with a warning. Callers fall back to their empty/default state.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read state file, using defaults");
            return None;
        }
    };

    if content.trim().is_empty() {
        tracing::warn!(path = %path.display(), "Empty state file, using defaults");
        return None;
    }

    match serde_json::from_str(&content) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to parse state file, using defaults"
            );
            None
        }
    }
}
