//! Shared value types: time-of-day keys, schedule entries and alert snapshots.
//!
//! `TimeOfDay` is the join key between the schedule, the fired set and the
//! completion set. On disk it is always the zero-padded `"HH:MM"` string.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AgendaError;

/// Periods offered by the editing layer. Loaded files may carry any label.
pub const PERIODS: [&str; 7] = [
    "MORNING",
    "PREPARATION",
    "TRAINING",
    "POST-TRAINING",
    "TRANSITION",
    "AFTERNOON",
    "EVENING",
];

pub const DEFAULT_COLOR: &str = "#FF6B35";
pub const UNTITLED: &str = "Untitled task";

/// A minute of the day, `00:00` through `23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, AgendaError> {
        if hour > 23 || minute > 59 {
            return Err(AgendaError::InvalidTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Truncates a wall-clock time to its minute.
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = AgendaError;

    /// Accepts `HH:MM` or `H:MM`. Minutes are always two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AgendaError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;

        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(h) || h.len() > 2 || !digits(m) || m.len() != 2 {
            return Err(invalid());
        }

        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimeVisitor;

        impl Visitor<'_> for TimeVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a time of day formatted as HH:MM")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TimeOfDay, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeVisitor)
    }
}

/// One scheduled task. Field names match the on-disk schedule format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "periodo", default)]
    pub period: String,
    #[serde(rename = "cor", default = "default_color")]
    pub color: String,
    #[serde(rename = "tarefas", default)]
    pub body_lines: Vec<String>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl ScheduleEntry {
    pub fn new(title: &str, period: &str, color: &str, body_lines: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            period: period.to_string(),
            color: color.to_string(),
            body_lines: body_lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Normalizes user input the way the editing forms do: trims everything,
    /// drops blank body lines, fills an empty title and rejects bad colors.
    pub fn validated(mut self) -> Result<Self, AgendaError> {
        self.body_lines = self
            .body_lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if self.body_lines.is_empty() {
            return Err(AgendaError::EmptyEntry);
        }

        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            self.title = UNTITLED.to_string();
        }

        self.color = self.color.trim().to_string();
        if !is_hex_color(&self.color) {
            return Err(AgendaError::InvalidColor(self.color));
        }

        self.period = self.period.trim().to_string();
        if self.period.is_empty() {
            self.period = PERIODS[0].to_string();
        }

        Ok(self)
    }
}

pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// By-value copy of what an alert shows. Later edits to the schedule
/// do not reach an alert that is already open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSnapshot {
    pub title: String,
    pub body_lines: Vec<String>,
    pub color: String,
}

impl From<&ScheduleEntry> for AlertSnapshot {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            title: entry.title.clone(),
            body_lines: entry.body_lines.clone(),
            color: entry.color.clone(),
        }
    }
}

impl AlertSnapshot {
    /// Content of the manual test alert.
    pub fn test_alert() -> Self {
        Self {
            title: "TEST ALERT".to_string(),
            body_lines: vec![
                "This is a test".to_string(),
                "Enter the secret to close".to_string(),
                "The sound repeats every few seconds".to_string(),
            ],
            color: "#00D4FF".to_string(),
        }
    }
}

/// What the scheduler hands to the UI loop when a key fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireEvent {
    pub key: TimeOfDay,
    pub snapshot: AlertSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_round_trip() {
        let t: TimeOfDay = "07:05".parse().unwrap();
        assert_eq!(t.hour(), 7);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.to_string(), "07:05");
    }

    #[test]
    fn test_parse_normalizes_single_digit_hour() {
        let t: TimeOfDay = "5:00".parse().unwrap();
        assert_eq!(t.to_string(), "05:00");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for bad in ["", "7", "24:00", "12:60", "12:5", "ab:cd", "123:00", "12:00:00", "-1:00"] {
            assert!(
                matches!(bad.parse::<TimeOfDay>(), Err(AgendaError::InvalidTime(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a: TimeOfDay = "05:00".parse().unwrap();
        let b: TimeOfDay = "05:01".parse().unwrap();
        let c: TimeOfDay = "13:00".parse().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_from_time_truncates_seconds() {
        let t = TimeOfDay::from_time(NaiveTime::from_hms_opt(6, 59, 59).unwrap());
        assert_eq!(t.to_string(), "06:59");
    }

    #[test]
    fn test_entry_uses_on_disk_field_names() {
        let json = r##"{"titulo":"Wake","periodo":"MORNING","cor":"#FF6B35","tarefas":["Water"]}"##;
        let entry: ScheduleEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.title, "Wake");
        assert_eq!(entry.body_lines, vec!["Water"]);

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["tarefas"][0], "Water");
    }

    #[test]
    fn test_validated_normalizes_input() {
        let entry = ScheduleEntry::new("  ", "", "#00d4ff", &["  a ", "", "b"])
            .validated()
            .unwrap();
        assert_eq!(entry.title, UNTITLED);
        assert_eq!(entry.period, PERIODS[0]);
        assert_eq!(entry.body_lines, vec!["a", "b"]);
    }

    #[test]
    fn test_validated_rejects_empty_body_and_bad_color() {
        let empty = ScheduleEntry::new("t", "MORNING", "#FFFFFF", &[" "]);
        assert!(matches!(empty.validated(), Err(AgendaError::EmptyEntry)));

        let bad_color = ScheduleEntry::new("t", "MORNING", "orange", &["x"]);
        assert!(matches!(
            bad_color.validated(),
            Err(AgendaError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_snapshot_is_detached_from_entry() {
        let mut entry = ScheduleEntry::new("Before", "MORNING", "#FFFFFF", &["x"]);
        let snapshot = AlertSnapshot::from(&entry);
        entry.title = "After".to_string();
        assert_eq!(snapshot.title, "Before");
    }
}
