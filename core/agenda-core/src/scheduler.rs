//! Background poller that fires each scheduled entry once per day.
//!
//! Every poll interval the scheduler truncates the current time to the
//! minute. If alerts are enabled, the minute is in the schedule and it has not
//! fired today, the key is added to the fired set, the set is saved, and a
//! [`FireEvent`] is posted to the UI loop. The UI loop builds the alert; the
//! scheduler never waits for it.
//!
//! A minute that is never observed (suspend, starvation longer than a minute)
//! is not caught up later.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::context::AppContext;
use crate::types::{AlertSnapshot, FireEvent, TimeOfDay};

pub struct Scheduler {
    ctx: Arc<AppContext>,
}

impl Scheduler {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// One poll. Returns the event to hand to the UI loop, if any.
    ///
    /// Picks up changes other processes made to the data files first, so an
    /// edit, a reset or an alerts toggle applies from this tick on.
    pub fn tick(&self) -> Option<FireEvent> {
        self.ctx.refresh_from_disk();
        if !self.ctx.is_alerts_enabled() {
            return None;
        }

        let now = self.ctx.clock().now_local();
        let key = TimeOfDay::from_time(now.time());
        let today = now.date();

        let schedule = self.ctx.schedule();
        let entry = schedule.schedule().get(key)?;

        let mut fired = self.ctx.fired();
        if fired.contains(key, today) {
            return None;
        }
        fired.insert(key, today);
        if let Err(e) = fired.save() {
            tracing::warn!(error = %e, key = %key, "Failed to save fired alerts");
        }

        tracing::info!(key = %key, title = %entry.title, "Alert fired");
        Some(FireEvent {
            key,
            snapshot: AlertSnapshot::from(entry),
        })
    }

    /// Starts the polling thread. Events are posted through `tx`, converted
    /// into whatever the UI loop consumes.
    pub fn spawn<T>(self, tx: Sender<T>) -> std::io::Result<SchedulerHandle>
    where
        T: From<FireEvent> + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        let interval = ctx.config().poll_interval();

        let thread = thread::Builder::new()
            .name("agenda-scheduler".to_string())
            .spawn(move || {
                tracing::debug!(interval_secs = interval.as_secs(), "Scheduler started");
                while self.ctx.is_running() {
                    if let Some(event) = self.tick() {
                        if tx.send(T::from(event)).is_err() {
                            tracing::debug!("UI loop gone, stopping scheduler");
                            break;
                        }
                    }

                    let deadline = Instant::now() + interval;
                    while self.ctx.is_running() {
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        thread::park_timeout(deadline - now);
                    }
                }
                tracing::debug!("Scheduler stopped");
            })?;

        Ok(SchedulerHandle { ctx, thread })
    }
}

pub struct SchedulerHandle {
    ctx: Arc<AppContext>,
    thread: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Clears the running flag, wakes the poller and waits for it to finish
    /// any tick in progress.
    pub fn stop(self) {
        self.ctx.request_stop();
        self.thread.thread().unpark();
        if self.thread.join().is_err() {
            tracing::error!("Scheduler thread panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::AgendaConfig;
    use crate::schedule::Schedule;
    use crate::storage::StorageConfig;
    use crate::types::ScheduleEntry;
    use chrono::Duration;
    use std::sync::mpsc;
    use tempfile::tempdir;

    fn key(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn two_entry_schedule() -> Schedule {
        [
            (key("05:00"), ScheduleEntry::new("A", "MORNING", "#FF6B35", &["a"])),
            (key("07:00"), ScheduleEntry::new("B", "MORNING", "#E63946", &["b"])),
        ]
        .into_iter()
        .collect()
    }

    fn context(clock: Arc<FixedClock>) -> Arc<AppContext> {
        Arc::new(AppContext::new_in_memory(
            AgendaConfig::default(),
            clock,
            two_entry_schedule(),
        ))
    }

    #[test]
    fn test_tick_fires_once_per_minute_match() {
        let clock = Arc::new(FixedClock::at("2026-10-19 05:00"));
        let ctx = context(clock.clone());
        let scheduler = Scheduler::new(ctx.clone());

        let event = scheduler.tick().unwrap();
        assert_eq!(event.key, key("05:00"));
        assert_eq!(event.snapshot.title, "A");
        assert_eq!(ctx.fired_keys(), vec![key("05:00")]);

        // Second poll inside the same minute
        clock.advance(Duration::seconds(30));
        assert!(scheduler.tick().is_none());
    }

    #[test]
    fn test_tick_ignores_unscheduled_minutes() {
        let clock = Arc::new(FixedClock::at("2026-10-19 05:01"));
        let ctx = context(clock);
        assert!(Scheduler::new(ctx.clone()).tick().is_none());
        assert!(ctx.fired_keys().is_empty());
    }

    #[test]
    fn test_tick_does_nothing_when_disabled() {
        let clock = Arc::new(FixedClock::at("2026-10-19 05:00"));
        let ctx = context(clock);
        ctx.set_alerts_enabled(false);
        assert!(Scheduler::new(ctx.clone()).tick().is_none());
        assert!(ctx.fired_keys().is_empty());
    }

    #[test]
    fn test_refires_after_day_rollover() {
        let clock = Arc::new(FixedClock::at("2026-10-19 05:00"));
        let ctx = context(clock.clone());
        let scheduler = Scheduler::new(ctx.clone());

        assert!(scheduler.tick().is_some());
        clock.advance(Duration::hours(24));
        assert!(scheduler.tick().is_some());
        assert_eq!(ctx.fired_keys(), vec![key("05:00")]);
    }

    #[test]
    fn test_tick_persists_fired_set() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::new(temp.path());
        let clock = Arc::new(FixedClock::at("2026-10-19 05:00"));
        let ctx = Arc::new(AppContext::load(
            &storage,
            AgendaConfig::default(),
            clock.clone(),
        ));

        assert!(Scheduler::new(ctx).tick().is_some());

        let reloaded = AppContext::load(&storage, AgendaConfig::default(), clock);
        assert_eq!(reloaded.fired_keys(), vec![key("05:00")]);
    }

    #[test]
    fn test_spawned_loop_posts_event_and_stops() {
        let clock = Arc::new(FixedClock::at("2026-10-19 07:00"));
        let ctx = context(clock);
        let (tx, rx) = mpsc::channel::<FireEvent>();

        let handle = Scheduler::new(ctx.clone()).spawn(tx).unwrap();
        let event = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(event.key, key("07:00"));

        let started = Instant::now();
        handle.stop();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert!(!ctx.is_running());
    }
}
