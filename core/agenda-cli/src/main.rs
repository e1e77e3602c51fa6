//! agenda: daily routine reminders in the terminal.
//!
//! `agenda` (or `agenda run`) starts the scheduler and shows alerts as they
//! come due. Every other subcommand edits the schedule or today's state and
//! exits.

mod commands;
mod format;
mod logging;
mod sound;
mod ui;

use std::path::PathBuf;

use agenda_core::{StorageConfig, TimeOfDay};
use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{App, CliResult, EntryArgs};

#[derive(Parser)]
#[command(name = "agenda", version, about = "Daily routine reminders with password-gated alerts")]
struct Cli {
    /// Data directory. Defaults to $AGENDA_HOME, then ~/.agenda.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler and show alerts as they come due.
    Run,

    /// Show today's schedule.
    List,

    /// Show the next alert that will ring today.
    Next,

    /// Schedule a new task.
    Add {
        /// Time of day, HH:MM.
        time: TimeOfDay,
        #[command(flatten)]
        fields: EntryFields,
        /// Overwrite a task already scheduled at this time.
        #[arg(long)]
        replace: bool,
    },

    /// Change a scheduled task. Unset fields keep their value.
    Edit {
        time: TimeOfDay,
        /// Move the task to another time.
        #[arg(long)]
        to: Option<TimeOfDay>,
        #[command(flatten)]
        fields: EntryFields,
    },

    /// Delete a scheduled task.
    Remove { time: TimeOfDay },

    /// Toggle a task as done for today.
    Done { time: TimeOfDay },

    /// Clear today's done marks.
    ResetDone,

    /// Forget which alerts already rang today.
    ResetAlerts,

    /// Open a test alert. With --at, shows that task's content.
    TestAlert {
        #[arg(long)]
        at: Option<TimeOfDay>,
    },

    /// Turn alerts on or off.
    Alerts { state: Switch },

    /// Shopping list.
    #[command(subcommand)]
    Shopping(ShoppingCommand),
}

#[derive(clap::Args)]
struct EntryFields {
    #[arg(long)]
    title: Option<String>,
    /// Label such as MORNING or EVENING.
    #[arg(long)]
    period: Option<String>,
    /// Accent color, #RRGGBB.
    #[arg(long)]
    color: Option<String>,
    /// Task line. Repeat for several lines.
    #[arg(long = "item", short = 'i')]
    items: Vec<String>,
}

impl From<EntryFields> for EntryArgs {
    fn from(f: EntryFields) -> Self {
        EntryArgs {
            title: f.title,
            period: f.period,
            color: f.color,
            items: f.items,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
enum ShoppingCommand {
    /// Show every category with its checked items.
    Show,
    /// Add a category.
    AddCategory { name: String },
    /// Delete a category and its items.
    RemoveCategory { name: String },
    /// Add an item to a category.
    Add { category: String, item: String },
    /// Delete an item from a category.
    Remove { category: String, item: String },
    /// Check or uncheck an item.
    Toggle { category: String, item: String },
    /// Uncheck everything.
    Reset,
}

fn main() {
    let cli = Cli::parse();

    let storage = match cli.data_dir {
        Some(dir) => StorageConfig::new(dir),
        None => match StorageConfig::from_env() {
            Ok(storage) => storage,
            Err(e) => {
                eprintln!("agenda: {}", e);
                std::process::exit(1);
            }
        },
    };

    let _log_guard = logging::init(storage.root());

    if let Err(e) = dispatch(App::new(storage), cli.command.unwrap_or(Command::Run)) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("agenda: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(app: App, command: Command) -> CliResult {
    match command {
        Command::Run => app.run()?,
        Command::List => app.list(),
        Command::Next => app.next(),
        Command::Add {
            time,
            fields,
            replace,
        } => app.add(time, fields.into(), replace)?,
        Command::Edit { time, to, fields } => app.edit(time, to, fields.into())?,
        Command::Remove { time } => app.remove(time)?,
        Command::Done { time } => app.done(time)?,
        Command::ResetDone => app.reset_done()?,
        Command::ResetAlerts => app.reset_alerts()?,
        Command::TestAlert { at } => app.test_alert(at)?,
        Command::Alerts { state } => app.set_alerts_enabled(matches!(state, Switch::On))?,
        Command::Shopping(cmd) => shopping(&app, cmd)?,
    }
    Ok(())
}

fn shopping(app: &App, command: ShoppingCommand) -> CliResult {
    if let ShoppingCommand::Show = command {
        app.shopping_show();
        return Ok(());
    }

    let mut list = app.shopping();
    match command {
        ShoppingCommand::Show => {}
        ShoppingCommand::AddCategory { name } => {
            list.add_category(&name)?;
            println!("Added category '{}'.", name.trim());
        }
        ShoppingCommand::RemoveCategory { name } => {
            list.remove_category(&name)?;
            println!("Removed category '{name}'.");
        }
        ShoppingCommand::Add { category, item } => {
            list.add_item(&category, &item)?;
            println!("Added '{}' to {category}.", item.trim());
        }
        ShoppingCommand::Remove { category, item } => {
            list.remove_item(&category, &item)?;
            println!("Removed '{item}' from {category}.");
        }
        ShoppingCommand::Toggle { category, item } => {
            let checked = list.toggle(&category, &item)?;
            println!("'{item}' {}.", if checked { "checked" } else { "unchecked" });
        }
        ShoppingCommand::Reset => {
            list.reset_checked()?;
            println!("All items unchecked.");
        }
    }
    Ok(())
}
