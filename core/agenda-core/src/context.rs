//! Application context: everything the scheduler, the alert gate and the UI
//! loop share, built once at startup.
//!
//! A file-backed context also watches its files. Other `agenda` processes
//! edit the same directory, so [`AppContext::refresh_from_disk`] reloads
//! whatever changed since it was last read. The scheduler calls it on every
//! tick.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use std::time::SystemTime;

use fs_err as fs;

use crate::clock::Clock;
use crate::config::AgendaConfig;
use crate::daily::{CompletionSet, FiredSet};
use crate::error::{AgendaError, Result};
use crate::schedule::{Schedule, ScheduleStore};
use crate::storage::StorageConfig;
use crate::types::{AlertSnapshot, ScheduleEntry, TimeOfDay};

/// Modification time and length of a file, `None` when it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp(Option<(SystemTime, u64)>);

impl FileStamp {
    fn of(path: &Path) -> Self {
        let stamp = fs::metadata(path)
            .ok()
            .and_then(|meta| Some((meta.modified().ok()?, meta.len())));
        Self(stamp)
    }
}

/// Last seen stamps of the files a context was loaded from.
struct DiskWatch {
    storage: StorageConfig,
    config: FileStamp,
    schedule: FileStamp,
    fired: FileStamp,
    completions: FileStamp,
}

impl DiskWatch {
    fn new(storage: &StorageConfig) -> Self {
        Self {
            storage: storage.clone(),
            config: FileStamp::of(&storage.config_file()),
            schedule: FileStamp::of(&storage.schedule_file()),
            fired: FileStamp::of(&storage.fired_file()),
            completions: FileStamp::of(&storage.completions_file()),
        }
    }
}

pub struct AppContext {
    config: AgendaConfig,
    clock: Arc<dyn Clock>,
    schedule: RwLock<ScheduleStore>,
    fired: Mutex<FiredSet>,
    completions: Mutex<CompletionSet>,
    alerts_enabled: AtomicBool,
    running: AtomicBool,
    disk: Option<Mutex<DiskWatch>>,
}

impl AppContext {
    /// Loads schedule and today's state from `storage`. Never fails on bad
    /// files; they load as defaults.
    pub fn load(storage: &StorageConfig, config: AgendaConfig, clock: Arc<dyn Clock>) -> Self {
        // Stamped before reading, so a write racing the load is picked up later.
        let watch = DiskWatch::new(storage);
        let today = clock.today();
        let schedule = ScheduleStore::load(&storage.schedule_file());
        let fired = FiredSet::load(&storage.fired_file(), today);
        let completions = CompletionSet::load(&storage.completions_file(), today);

        tracing::info!(
            root = %storage.root().display(),
            entries = schedule.schedule().len(),
            fired_today = fired.keys(today).len(),
            "Context loaded"
        );

        let mut ctx = Self::from_parts(config, clock, schedule, fired, completions);
        ctx.disk = Some(Mutex::new(watch));
        ctx
    }

    /// Context with no backing files.
    pub fn new_in_memory(config: AgendaConfig, clock: Arc<dyn Clock>, schedule: Schedule) -> Self {
        let today = clock.today();
        Self::from_parts(
            config,
            clock,
            ScheduleStore::new_in_memory(schedule),
            FiredSet::new_in_memory(today),
            CompletionSet::new_in_memory(today),
        )
    }

    fn from_parts(
        config: AgendaConfig,
        clock: Arc<dyn Clock>,
        schedule: ScheduleStore,
        fired: FiredSet,
        completions: CompletionSet,
    ) -> Self {
        let alerts_enabled = config.alerts_enabled;
        Self {
            config,
            clock,
            schedule: RwLock::new(schedule),
            fired: Mutex::new(fired),
            completions: Mutex::new(completions),
            alerts_enabled: AtomicBool::new(alerts_enabled),
            running: AtomicBool::new(true),
            disk: None,
        }
    }

    pub fn config(&self) -> &AgendaConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------

    pub fn is_alerts_enabled(&self) -> bool {
        self.alerts_enabled.load(Ordering::SeqCst)
    }

    pub fn set_alerts_enabled(&self, enabled: bool) {
        self.alerts_enabled.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "Alerts toggled");
    }

    /// Sets the flag and writes it to `config.json` so other processes and
    /// the next start agree.
    pub fn save_alerts_enabled(&self, enabled: bool) -> Result<()> {
        self.set_alerts_enabled(enabled);
        let Some(disk) = &self.disk else {
            return Ok(());
        };
        let storage = disk.lock().unwrap_or_else(PoisonError::into_inner).storage.clone();
        let mut config = AgendaConfig::load(&storage);
        config.alerts_enabled = enabled;
        config.save(&storage)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clears the running flag. Background loops exit on their next check.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    // ---------------------------------------------------------------------
    // Schedule
    // ---------------------------------------------------------------------

    pub fn schedule(&self) -> RwLockReadGuard<'_, ScheduleStore> {
        self.schedule.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs an edit against the schedule and saves it if the edit succeeded.
    /// A failed save is returned; the edit stays applied in memory.
    pub fn edit_schedule<T>(&self, edit: impl FnOnce(&mut ScheduleStore) -> Result<T>) -> Result<T> {
        let mut store = self.schedule.write().unwrap_or_else(PoisonError::into_inner);
        let out = edit(&mut store)?;
        store.save()?;
        Ok(out)
    }

    pub fn entry(&self, key: TimeOfDay) -> Option<ScheduleEntry> {
        self.schedule().schedule().get(key).cloned()
    }

    pub fn snapshot(&self, key: TimeOfDay) -> Option<AlertSnapshot> {
        self.schedule().schedule().get(key).map(AlertSnapshot::from)
    }

    /// Next entry that will fire today, for display.
    pub fn next_upcoming(&self) -> Option<(TimeOfDay, ScheduleEntry)> {
        let now = self.clock.now_local();
        // Lock order everywhere: schedule, then fired.
        let schedule = self.schedule();
        let fired = self.fired();
        let next = schedule
            .schedule()
            .next_upcoming(&fired, TimeOfDay::from_time(now.time()), now.date())
            .map(|(k, e)| (k, e.clone()));
        next
    }

    // ---------------------------------------------------------------------
    // Fired alerts
    // ---------------------------------------------------------------------

    pub(crate) fn fired(&self) -> MutexGuard<'_, FiredSet> {
        self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fired_keys(&self) -> Vec<TimeOfDay> {
        self.fired().keys(self.clock.today())
    }

    /// Empties today's fired set and persists it.
    pub fn reset_alerts(&self) -> Result<()> {
        let mut fired = self.fired();
        fired.clear(self.clock.today());
        tracing::info!("Fired alerts reset");
        fired.save()
    }

    // ---------------------------------------------------------------------
    // Completions
    // ---------------------------------------------------------------------

    fn completions(&self) -> MutexGuard<'_, CompletionSet> {
        self.completions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_done(&self, key: TimeOfDay) -> bool {
        self.completions().is_done(key, self.clock.today())
    }

    pub fn done_count(&self) -> usize {
        self.completions().done_count(self.clock.today())
    }

    /// Flips the done flag of a scheduled task and returns the new value.
    pub fn toggle_done(&self, key: TimeOfDay) -> Result<bool> {
        if !self.schedule().schedule().contains(key) {
            return Err(AgendaError::NotFound(key));
        }
        let mut completions = self.completions();
        let done = completions.toggle(key, self.clock.today());
        completions.save()?;
        Ok(done)
    }

    pub fn reset_completions(&self) -> Result<()> {
        let mut completions = self.completions();
        completions.reset(self.clock.today());
        completions.save()
    }

    // ---------------------------------------------------------------------
    // Disk
    // ---------------------------------------------------------------------

    /// Reloads every backing file whose stamp changed since it was last read.
    /// In-memory contexts have nothing to reload.
    ///
    /// Takes the watch lock first, then schedule, fired and completions in
    /// turn, never two of those at once.
    pub fn refresh_from_disk(&self) {
        let Some(disk) = &self.disk else {
            return;
        };
        let mut watch = disk.lock().unwrap_or_else(PoisonError::into_inner);
        let storage = watch.storage.clone();
        let today = self.clock.today();

        let stamp = FileStamp::of(&storage.config_file());
        if stamp != watch.config {
            watch.config = stamp;
            let enabled = AgendaConfig::load(&storage).alerts_enabled;
            if enabled != self.is_alerts_enabled() {
                self.set_alerts_enabled(enabled);
            }
        }

        let path = storage.schedule_file();
        let stamp = FileStamp::of(&path);
        if stamp != watch.schedule {
            watch.schedule = stamp;
            let store = ScheduleStore::load(&path);
            if store.is_unreadable() {
                tracing::warn!("Schedule changed on disk but is unreadable, keeping current one");
            } else {
                tracing::info!(entries = store.schedule().len(), "Schedule reloaded from disk");
                *self.schedule.write().unwrap_or_else(PoisonError::into_inner) = store;
            }
        }

        let path = storage.fired_file();
        let stamp = FileStamp::of(&path);
        if stamp != watch.fired {
            watch.fired = stamp;
            let fired = FiredSet::load(&path, today);
            tracing::debug!(fired_today = fired.keys(today).len(), "Fired alerts reloaded from disk");
            *self.fired() = fired;
        }

        let path = storage.completions_file();
        let stamp = FileStamp::of(&path);
        if stamp != watch.completions {
            watch.completions = stamp;
            *self.completions() = CompletionSet::load(&path, today);
            tracing::debug!("Completions reloaded from disk");
        }
    }
}
