//! Terminal UI loop.
//!
//! Single consumer of [`UiEvent`]s. The scheduler thread and the stdin reader
//! only post events; every alert session is created, driven and dropped here.
//!
//! ## Input routing
//!
//! ```text
//! alert open    : ":close"        → attempt_close on the oldest open alert
//!                 anything else   → submit as the secret
//!                 end of input    → attempt_close (stays open)
//! no alert open : commands (help, list, next, test, reset, done, alerts, quit)
//!                 end of input    → quit
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

use agenda_core::alert::{AlertGate, AlertSession, AlertWindow, GateHint, SubmitOutcome};
use agenda_core::{AlertSnapshot, AppContext, FireEvent, TimeOfDay};

use crate::format;

pub const CLOSE_COMMAND: &str = ":close";

#[derive(Debug)]
pub enum UiEvent {
    AlertFired(FireEvent),
    ManualTest(Option<TimeOfDay>),
    Line(String),
    InputClosed,
}

impl From<FireEvent> for UiEvent {
    fn from(event: FireEvent) -> Self {
        UiEvent::AlertFired(event)
    }
}

/// Where the UI writes. Shared by the loop and every alert window; UI thread only.
#[derive(Clone)]
pub struct Console(Rc<RefCell<Box<dyn Write>>>);

impl Console {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write>) -> Self {
        Self(Rc::new(RefCell::new(out)))
    }

    pub fn line(&self, text: &str) {
        let mut out = self.0.borrow_mut();
        // A closed stdout is not worth crashing the reminder over.
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

/// Alert drawn as a block of text on the console.
pub struct TerminalWindow {
    console: Console,
    label: String,
}

impl TerminalWindow {
    pub fn open(console: Console, snapshot: &AlertSnapshot, at: &str) -> Self {
        for line in format::alert_box(snapshot, at) {
            console.line(&line);
        }
        Self {
            console,
            label: snapshot.title.clone(),
        }
    }
}

impl AlertWindow for TerminalWindow {
    fn request_foreground(&mut self) {
        self.console
            .line(&format!("Enter the secret to close '{}':", self.label));
    }

    fn set_always_on_top(&mut self) {
        tracing::debug!(alert = %self.label, "Terminal alerts are always in front");
    }

    fn show_hint(&mut self, hint: GateHint) {
        self.console.line(&format!("  !! {hint}"));
    }

    fn clear_input(&mut self) {}

    fn release(&mut self) {
        self.console.line(&format!("Alert '{}' closed.", self.label));
    }
}

pub struct UiLoop {
    ctx: Arc<AppContext>,
    gate: AlertGate,
    console: Console,
    sessions: VecDeque<AlertSession<TerminalWindow>>,
    exit_when_idle: bool,
}

impl UiLoop {
    pub fn new(ctx: Arc<AppContext>, gate: AlertGate, console: Console) -> Self {
        Self {
            ctx,
            gate,
            console,
            sessions: VecDeque::new(),
            exit_when_idle: false,
        }
    }

    /// Leave the loop as soon as no alert is open (one-shot test alerts).
    pub fn exit_when_idle(mut self) -> Self {
        self.exit_when_idle = true;
        self
    }

    pub fn open_alerts(&self) -> usize {
        self.sessions.len()
    }

    /// Runs until `quit`, end of input with nothing open, or every sender is gone.
    pub fn run(&mut self, rx: Receiver<UiEvent>) {
        for event in rx {
            if !self.handle(event) {
                break;
            }
        }
        self.ctx.request_stop();
    }

    /// Processes one event. Returns false when the loop should stop.
    pub fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::AlertFired(fire) => {
                tracing::debug!(key = %fire.key, "Opening scheduled alert");
                self.open(fire.snapshot);
            }
            UiEvent::ManualTest(key) => {
                let snapshot = key
                    .and_then(|k| self.ctx.snapshot(k))
                    .unwrap_or_else(AlertSnapshot::test_alert);
                tracing::info!(key = ?key, "Manual test alert");
                self.open(snapshot);
            }
            UiEvent::Line(line) => return self.handle_line(line.trim_end_matches(['\r', '\n'])),
            UiEvent::InputClosed => {
                if let Some(session) = self.sessions.front_mut() {
                    session.attempt_close();
                } else {
                    return false;
                }
            }
        }
        !(self.exit_when_idle && self.sessions.is_empty())
    }

    fn open(&mut self, snapshot: AlertSnapshot) {
        let now = self.ctx.clock().now_local();
        let window = TerminalWindow::open(
            self.console.clone(),
            &snapshot,
            &now.format("%H:%M").to_string(),
        );
        let session = self.gate.spawn(snapshot, window, now);
        self.sessions.push_back(session);
    }

    fn handle_line(&mut self, line: &str) -> bool {
        if let Some(session) = self.sessions.front_mut() {
            if line.trim() == CLOSE_COMMAND {
                session.attempt_close();
            } else if session.submit(line) == SubmitOutcome::Accepted {
                self.sessions.pop_front();
                if let Some(next) = self.sessions.front() {
                    self.console.line(&format!(
                        "{} more alert(s) open. Enter the secret to close '{}':",
                        self.sessions.len(),
                        next.snapshot().title
                    ));
                } else if !self.exit_when_idle {
                    self.console.line(&format::next_line(&self.ctx));
                }
            }
            return !(self.exit_when_idle && self.sessions.is_empty());
        }
        self.command(line)
    }

    fn command(&mut self, line: &str) -> bool {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return true;
        };
        let arg = words.next();
        // Edits made by `agenda add` and friends while this loop runs
        self.ctx.refresh_from_disk();

        match cmd {
            "help" => {
                for line in format::HELP {
                    self.console.line(line);
                }
            }
            "list" => {
                for line in format::schedule_lines(&self.ctx) {
                    self.console.line(&line);
                }
            }
            "next" => self.console.line(&format::next_line(&self.ctx)),
            "test" => match arg.map(str::parse::<TimeOfDay>) {
                Some(Err(e)) => self.console.line(&e.to_string()),
                Some(Ok(key)) => return self.handle(UiEvent::ManualTest(Some(key))),
                None => return self.handle(UiEvent::ManualTest(None)),
            },
            "reset" => match self.ctx.reset_alerts() {
                Ok(()) => self.console.line("Fired alerts reset."),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to save fired alerts");
                    self.console
                        .line(&format!("Fired alerts reset for this session only: {e}"));
                }
            },
            "done" => match arg.map(str::parse::<TimeOfDay>) {
                Some(Ok(key)) => match self.ctx.toggle_done(key) {
                    Ok(true) => self.console.line(&format!("{key} marked done.")),
                    Ok(false) => self.console.line(&format!("{key} marked not done.")),
                    Err(e) => {
                        tracing::warn!(error = %e, key = %key, "Failed to toggle task");
                        self.console.line(&e.to_string());
                    }
                },
                Some(Err(e)) => self.console.line(&e.to_string()),
                None => self.console.line("usage: done HH:MM"),
            },
            "alerts" => match arg {
                Some(state @ ("on" | "off")) => {
                    if let Err(e) = self.ctx.save_alerts_enabled(state == "on") {
                        tracing::warn!(error = %e, "Failed to save alerts setting");
                        self.console
                            .line(&format!("Alerts {state} for this session only: {e}"));
                    }
                }
                _ => self.console.line(&format!(
                    "Alerts are {}.",
                    if self.ctx.is_alerts_enabled() { "on" } else { "off" }
                )),
            },
            "quit" | "exit" => return false,
            other => self
                .console
                .line(&format!("Unknown command '{other}'. Type 'help'.")),
        }
        true
    }
}

/// Forwards stdin lines to the UI loop. Sends `InputClosed` at end of input.
pub fn spawn_stdin_reader(tx: Sender<UiEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("agenda-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(UiEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read stdin");
                        break;
                    }
                }
            }
            let _ = tx.send(UiEvent::InputClosed);
        })?;
    Ok(())
}
