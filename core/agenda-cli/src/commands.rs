//! One-shot subcommands. Each loads what it needs, acts, saves and prints.

use std::sync::mpsc;
use std::sync::Arc;

use agenda_core::alert::AlertGate;
use agenda_core::shopping::ShoppingList;
use agenda_core::types::DEFAULT_COLOR;
use agenda_core::{
    AgendaConfig, AgendaError, AppContext, ScheduleEntry, Scheduler, StorageConfig, SystemClock,
    TimeOfDay,
};
use thiserror::Error;

use crate::format;
use crate::sound;
use crate::ui::{self, Console, UiEvent, UiLoop};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Agenda(#[from] AgendaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

pub type CliResult<T = ()> = Result<T, CliError>;

/// Fields given on the command line for a new or edited task.
#[derive(Debug, Default)]
pub struct EntryArgs {
    pub title: Option<String>,
    pub period: Option<String>,
    pub color: Option<String>,
    pub items: Vec<String>,
}

impl EntryArgs {
    fn into_entry(self) -> ScheduleEntry {
        self.merge_into(ScheduleEntry::new("", "", DEFAULT_COLOR, &[]))
    }

    /// Overlays the given fields onto `base`. Items replace the whole body.
    fn merge_into(self, mut base: ScheduleEntry) -> ScheduleEntry {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(period) = self.period {
            base.period = period;
        }
        if let Some(color) = self.color {
            base.color = color;
        }
        if !self.items.is_empty() {
            base.body_lines = self.items;
        }
        base
    }
}

pub struct App {
    storage: StorageConfig,
    config: AgendaConfig,
}

impl App {
    pub fn new(storage: StorageConfig) -> Self {
        let config = AgendaConfig::load(&storage);
        Self { storage, config }
    }

    fn context(&self) -> Arc<AppContext> {
        Arc::new(AppContext::load(
            &self.storage,
            self.config.clone(),
            Arc::new(SystemClock),
        ))
    }

    fn gate(&self) -> AlertGate {
        AlertGate::new(
            &self.config.secret,
            sound::cue_player(self.config.cue_asset.clone()),
            self.config.cue_interval(),
        )
    }

    // ---------------------------------------------------------------------
    // Interactive
    // ---------------------------------------------------------------------

    /// Scheduler plus terminal alerts until `quit`.
    pub fn run(&self) -> CliResult {
        let ctx = self.context();
        let (tx, rx) = mpsc::channel::<UiEvent>();
        let scheduler = Scheduler::new(Arc::clone(&ctx)).spawn(tx.clone())?;
        ui::spawn_stdin_reader(tx)?;

        let console = Console::stdout();
        console.line("Agenda is running. Type 'help' for commands.");
        console.line(&format::next_line(&ctx));

        UiLoop::new(ctx, self.gate(), console).run(rx);
        scheduler.stop();
        tracing::info!("Agenda stopped");
        Ok(())
    }

    /// Opens one test alert and returns once it is dismissed.
    pub fn test_alert(&self, at: Option<TimeOfDay>) -> CliResult {
        let ctx = self.context();
        if let Some(key) = at {
            if ctx.entry(key).is_none() {
                return Err(AgendaError::NotFound(key).into());
            }
        }

        let (tx, rx) = mpsc::channel::<UiEvent>();
        // Queued before the reader starts, so it is handled first.
        let _ = tx.send(UiEvent::ManualTest(at));
        ui::spawn_stdin_reader(tx)?;

        UiLoop::new(ctx, self.gate(), Console::stdout())
            .exit_when_idle()
            .run(rx);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Schedule
    // ---------------------------------------------------------------------

    pub fn list(&self) {
        let ctx = self.context();
        for line in format::schedule_lines(&ctx) {
            println!("{line}");
        }
        println!("{}", format::next_line(&ctx));
    }

    pub fn next(&self) {
        println!("{}", format::next_line(&self.context()));
    }

    pub fn add(&self, key: TimeOfDay, args: EntryArgs, replace: bool) -> CliResult {
        let ctx = self.context();
        ctx.edit_schedule(|s| s.add(key, args.into_entry(), replace))
            .map_err(|e| match e {
                AgendaError::Conflict(_) => CliError::Usage(format!(
                    "A task already exists at {key}. Use --replace to overwrite it."
                )),
                other => other.into(),
            })?;
        println!("Added task at {key}.");
        Ok(())
    }

    pub fn edit(&self, key: TimeOfDay, to: Option<TimeOfDay>, args: EntryArgs) -> CliResult {
        let ctx = self.context();
        let current = ctx.entry(key).ok_or(AgendaError::NotFound(key))?;
        let new_key = to.unwrap_or(key);
        ctx.edit_schedule(|s| s.edit(key, new_key, args.merge_into(current)))?;
        println!("Updated task at {new_key}.");
        Ok(())
    }

    pub fn remove(&self, key: TimeOfDay) -> CliResult {
        let removed = self.context().edit_schedule(|s| s.delete(key))?;
        println!("Removed '{}' at {key}.", removed.title);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Daily state
    // ---------------------------------------------------------------------

    pub fn done(&self, key: TimeOfDay) -> CliResult {
        let done = self.context().toggle_done(key)?;
        println!("{key} marked {}.", if done { "done" } else { "not done" });
        Ok(())
    }

    pub fn reset_done(&self) -> CliResult {
        self.context().reset_completions()?;
        println!("Completed tasks cleared for today.");
        Ok(())
    }

    pub fn reset_alerts(&self) -> CliResult {
        self.context().reset_alerts()?;
        println!("Fired alerts reset. Today's remaining times will ring again.");
        Ok(())
    }

    /// Saved to `config.json`; a running `agenda run` picks it up on its next tick.
    pub fn set_alerts_enabled(&self, enabled: bool) -> CliResult {
        self.context().save_alerts_enabled(enabled)?;
        println!("Alerts {}.", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Shopping list
    // ---------------------------------------------------------------------

    pub fn shopping(&self) -> ShoppingList {
        ShoppingList::load(&self.storage)
    }

    pub fn shopping_show(&self) {
        let list = self.shopping();
        for (category, items) in list.categories() {
            println!("{category}");
            for item in items {
                let mark = if list.is_checked(category, item) { 'x' } else { ' ' };
                println!("  [{mark}] {item}");
            }
        }
        println!("{} item(s) checked", list.checked_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_args_fill_new_entry() {
        let entry = EntryArgs {
            title: Some("Stretch".to_string()),
            items: vec!["Neck".to_string(), "Back".to_string()],
            ..Default::default()
        }
        .into_entry()
        .validated()
        .unwrap();

        assert_eq!(entry.title, "Stretch");
        assert_eq!(entry.body_lines, vec!["Neck", "Back"]);
        assert_eq!(entry.color, DEFAULT_COLOR);
    }

    #[test]
    fn test_entry_args_merge_keeps_unset_fields() {
        let base = ScheduleEntry::new("Lunch", "AFTERNOON", "#FFD166", &["Rice"]);
        let merged = EntryArgs {
            color: Some("#000000".to_string()),
            ..Default::default()
        }
        .merge_into(base);

        assert_eq!(merged.title, "Lunch");
        assert_eq!(merged.color, "#000000");
        assert_eq!(merged.body_lines, vec!["Rice"]);
    }

    #[test]
    fn test_edit_moves_task() {
        let temp = tempfile::tempdir().unwrap();
        let app = App::new(StorageConfig::new(temp.path()));

        app.edit(
            "07:00".parse().unwrap(),
            Some("07:15".parse().unwrap()),
            EntryArgs::default(),
        )
        .unwrap();

        let ctx = app.context();
        assert!(ctx.entry("07:00".parse().unwrap()).is_none());
        assert_eq!(ctx.entry("07:15".parse().unwrap()).unwrap().title, "Breakfast");
    }

    #[test]
    fn test_add_conflict_suggests_replace() {
        let temp = tempfile::tempdir().unwrap();
        let app = App::new(StorageConfig::new(temp.path()));
        let args = || EntryArgs {
            items: vec!["x".to_string()],
            ..Default::default()
        };

        let err = app.add("07:00".parse().unwrap(), args(), false).unwrap_err();
        assert!(err.to_string().contains("--replace"));
        app.add("07:00".parse().unwrap(), args(), true).unwrap();
    }

    #[test]
    fn test_alerts_toggle_persists_in_config() {
        let temp = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(temp.path());
        let app = App::new(storage.clone());

        app.set_alerts_enabled(false).unwrap();
        assert!(!AgendaConfig::load(&storage).alerts_enabled);
    }

    #[test]
    fn test_failed_save_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("agenda");
        fs_err::write(&root, "").unwrap();
        let app = App::new(StorageConfig::new(&root));
        let args = EntryArgs {
            items: vec!["x".to_string()],
            ..Default::default()
        };

        assert!(app.add("09:00".parse().unwrap(), args, false).is_err());
        assert!(app.remove("07:00".parse().unwrap()).is_err());
        assert!(app.done("07:00".parse().unwrap()).is_err());
        assert!(app.reset_done().is_err());
        assert!(app.reset_alerts().is_err());
        assert!(app.set_alerts_enabled(false).is_err());
    }
}
