//! Per-day state: which alerts already fired and which tasks are done.
//!
//! Both files carry the calendar date they were written for. A record whose
//! date is not today is treated as empty; the next save overwrites it.
//!
//! # File Formats
//!
//! ```json
//! { "data": "2026-10-19", "alertas": ["05:00", "07:00"] }
//! { "data": "2026-10-19", "conclusoes": { "05:00": true } }
//! ```

mod completion;
mod fired;

use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::fs_util::read_json;

pub use completion::CompletionSet;
pub use fired::FiredSet;

/// The day-rollover invariant: a persisted record only applies to the day it
/// was captured for.
pub fn is_current(record_date: NaiveDate, today: NaiveDate) -> bool {
    record_date == today
}

/// On-disk record stamped with the date it belongs to.
pub(crate) trait DatedRecord: DeserializeOwned {
    fn date(&self) -> NaiveDate;
}

/// Loads a dated record, returning `None` when it is missing, unreadable or
/// from another day.
pub(crate) fn load_for_day<R: DatedRecord>(path: &Path, today: NaiveDate) -> Option<R> {
    let record: R = read_json(path)?;
    if is_current(record.date(), today) {
        Some(record)
    } else {
        tracing::debug!(
            path = %path.display(),
            stale_date = %record.date(),
            today = %today,
            "Ignoring state from a previous day"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_current_only_for_same_date() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(is_current(d, d));
        assert!(!is_current(d, d.succ_opt().unwrap()));
        assert!(!is_current(d.succ_opt().unwrap(), d));
    }
}
