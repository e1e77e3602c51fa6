//! The password-gated alert.
//!
//! ## State Machine
//!
//! ```text
//! spawn                 → Open   (cue now, then every cue interval; foreground; always on top)
//! attempt_close  (Open) → Open   (hint "enter the secret", cue now)
//! submit wrong   (Open) → Open   (input cleared, error hint, cue now)
//! submit secret  (Open) → Closed (repetition stopped, window released)
//! anything     (Closed) → Closed (no side effects)
//! ```
//!
//! There is no timeout and no attempt limit. Only the secret closes a session.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use super::cue::{CuePlayer, CueRepeater, CueToken};
use crate::types::AlertSnapshot;

pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open,
    Closed,
}

/// Inline message the window shows under the secret field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateHint {
    /// The user tried to close the window.
    EnterSecretToClose,
    /// The submitted text did not match.
    WrongSecret,
}

impl fmt::Display for GateHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateHint::EnterSecretToClose => f.write_str("Enter the secret to close this alert"),
            GateHint::WrongSecret => f.write_str("Wrong secret"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected,
    AlreadyClosed,
}

/// The window an alert is drawn in. Only ever touched from the UI loop.
pub trait AlertWindow {
    fn request_foreground(&mut self);
    fn set_always_on_top(&mut self);
    fn show_hint(&mut self, hint: GateHint);
    fn clear_input(&mut self);
    fn release(&mut self);
}

/// Builds alert sessions. Holds what every session shares: the secret, the
/// cue player and the repeat interval.
pub struct AlertGate {
    secret: Arc<str>,
    cue: Arc<dyn CuePlayer>,
    cue_interval: Duration,
    next_id: SessionId,
}

impl AlertGate {
    pub fn new(secret: &str, cue: Arc<dyn CuePlayer>, cue_interval: Duration) -> Self {
        Self {
            secret: Arc::from(secret),
            cue,
            cue_interval,
            next_id: 1,
        }
    }

    /// Opens a new session in `window`. Used for scheduled and manual alerts
    /// alike; fired-set bookkeeping is the caller's business.
    pub fn spawn<W: AlertWindow>(
        &mut self,
        snapshot: AlertSnapshot,
        mut window: W,
        opened_at: NaiveDateTime,
    ) -> AlertSession<W> {
        let id = self.next_id;
        self.next_id += 1;

        let token = CueToken::new(id);
        token.play_if_open(self.cue.as_ref());
        let repeater = CueRepeater::start(Arc::clone(&token), Arc::clone(&self.cue), self.cue_interval);

        window.request_foreground();
        window.set_always_on_top();

        tracing::info!(session = id, title = %snapshot.title, "Alert opened");

        AlertSession {
            id,
            snapshot,
            opened_at,
            state: GateState::Open,
            window,
            secret: Arc::clone(&self.secret),
            cue: Arc::clone(&self.cue),
            token,
            repeater,
            failed_attempts: 0,
        }
    }
}

pub struct AlertSession<W: AlertWindow> {
    id: SessionId,
    snapshot: AlertSnapshot,
    opened_at: NaiveDateTime,
    state: GateState,
    window: W,
    secret: Arc<str>,
    cue: Arc<dyn CuePlayer>,
    token: Arc<CueToken>,
    repeater: CueRepeater,
    failed_attempts: u64,
}

impl<W: AlertWindow> AlertSession<W> {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn snapshot(&self) -> &AlertSnapshot {
        &self.snapshot
    }

    pub fn opened_at(&self) -> NaiveDateTime {
        self.opened_at
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::Open
    }

    /// Wrong submissions so far. Informational only; there is no limit.
    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// The window's close control. Never closes an open session.
    pub fn attempt_close(&mut self) {
        if !self.is_open() {
            return;
        }
        tracing::debug!(session = self.id, "Close refused, secret required");
        self.window.show_hint(GateHint::EnterSecretToClose);
        self.token.play_if_open(self.cue.as_ref());
    }

    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if !self.is_open() {
            return SubmitOutcome::AlreadyClosed;
        }

        if text == &*self.secret {
            self.state = GateState::Closed;
            self.repeater.stop();
            self.window.release();
            tracing::info!(
                session = self.id,
                failed_attempts = self.failed_attempts,
                "Alert dismissed"
            );
            return SubmitOutcome::Accepted;
        }

        self.failed_attempts += 1;
        tracing::debug!(session = self.id, attempts = self.failed_attempts, "Wrong secret");
        self.window.clear_input();
        self.window.show_hint(GateHint::WrongSecret);
        self.token.play_if_open(self.cue.as_ref());
        SubmitOutcome::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingCue, RecordingWindow, WindowCall};
    use std::thread;
    use std::time::Instant;

    fn opened_at() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-10-19 05:00", "%Y-%m-%d %H:%M").unwrap()
    }

    fn new_gate(cue: Arc<RecordingCue>, interval: Duration) -> AlertGate {
        AlertGate::new("25798463", cue, interval)
    }

    #[test]
    fn test_spawn_opens_with_immediate_cue() {
        let cue = Arc::new(RecordingCue::default());
        let mut gate = new_gate(cue.clone(), Duration::from_secs(60));

        let session = gate.spawn(AlertSnapshot::test_alert(), RecordingWindow::default(), opened_at());

        assert!(session.is_open());
        assert_eq!(cue.count(), 1);
        assert_eq!(
            session.window().calls(),
            vec![WindowCall::Foreground, WindowCall::AlwaysOnTop]
        );
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let cue = Arc::new(RecordingCue::default());
        let mut gate = new_gate(cue, Duration::from_secs(60));
        let a = gate.spawn(AlertSnapshot::test_alert(), RecordingWindow::default(), opened_at());
        let b = gate.spawn(AlertSnapshot::test_alert(), RecordingWindow::default(), opened_at());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_attempt_close_stays_open_and_cues() {
        let cue = Arc::new(RecordingCue::default());
        let mut gate = new_gate(cue.clone(), Duration::from_secs(60));
        let mut session =
            gate.spawn(AlertSnapshot::test_alert(), RecordingWindow::default(), opened_at());

        for _ in 0..3 {
            session.attempt_close();
        }

        assert!(session.is_open());
        assert_eq!(cue.count(), 4);
        assert!(session
            .window()
            .calls()
            .contains(&WindowCall::Hint(GateHint::EnterSecretToClose)));
        assert!(!session.window().calls().contains(&WindowCall::Release));
    }

    #[test]
    fn test_wrong_secret_keeps_session_open() {
        let cue = Arc::new(RecordingCue::default());
        let mut gate = new_gate(cue.clone(), Duration::from_secs(60));
        let mut session =
            gate.spawn(AlertSnapshot::test_alert(), RecordingWindow::default(), opened_at());

        for attempt in 1..=50u64 {
            assert_eq!(session.submit("wrong"), SubmitOutcome::Rejected);
            assert_eq!(session.failed_attempts(), attempt);
        }

        assert!(session.is_open());
        assert_eq!(cue.count(), 51);
        let calls = session.window().calls();
        assert!(calls.contains(&WindowCall::ClearInput));
        assert!(calls.contains(&WindowCall::Hint(GateHint::WrongSecret)));
    }

    #[test]
    fn test_correct_secret_closes_and_releases() {
        let cue = Arc::new(RecordingCue::default());
        let mut gate = new_gate(cue.clone(), Duration::from_secs(60));
        let mut session =
            gate.spawn(AlertSnapshot::test_alert(), RecordingWindow::default(), opened_at());

        assert_eq!(session.submit("25798463"), SubmitOutcome::Accepted);
        assert_eq!(session.state(), GateState::Closed);
        assert_eq!(session.window().calls().last(), Some(&WindowCall::Release));

        let cues = cue.count();
        session.attempt_close();
        assert_eq!(session.submit("25798463"), SubmitOutcome::AlreadyClosed);
        assert_eq!(cue.count(), cues);
    }

    #[test]
    fn test_repetition_runs_while_open_and_stops_on_close() {
        let cue = Arc::new(RecordingCue::default());
        let mut gate = new_gate(cue.clone(), Duration::from_millis(10));
        let mut session =
            gate.spawn(AlertSnapshot::test_alert(), RecordingWindow::default(), opened_at());

        let started = Instant::now();
        while cue.count() < 4 {
            assert!(started.elapsed() < Duration::from_secs(5), "cue never repeated");
            thread::sleep(Duration::from_millis(5));
        }

        session.attempt_close();
        assert_eq!(session.submit("nope"), SubmitOutcome::Rejected);
        let before = cue.count();
        thread::sleep(Duration::from_millis(40));
        assert!(cue.count() > before, "repetition must continue after a refused close");

        assert_eq!(session.submit("25798463"), SubmitOutcome::Accepted);
        let after_close = cue.count();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(cue.count(), after_close);
    }
}
