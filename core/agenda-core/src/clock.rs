//! Wall-clock source.
//!
//! Everything that asks "what day / minute is it" goes through [`Clock`] so the
//! scheduler and the daily stores can be driven by a fixed clock in tests.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::types::TimeOfDay;

pub trait Clock: Send + Sync {
    fn now_local(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now_local().date()
    }

    fn minute_now(&self) -> TimeOfDay {
        TimeOfDay::from_time(self.now_local().time())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to.
/// Only available with the `test-helpers` feature or in tests.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug)]
pub struct FixedClock {
    now: std::sync::Mutex<NaiveDateTime>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    /// `FixedClock::at("2026-10-19 04:59")`.
    pub fn at(stamp: &str) -> Self {
        Self::new(
            NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M").expect("valid test timestamp"),
        )
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Clock for FixedClock {
    fn now_local(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}
