//! Recording collaborators for tests.
//! Only available with the `test-helpers` feature or in tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::alert::{AlertWindow, CuePlayer, GateHint};

/// Counts cues instead of playing them.
#[derive(Debug, Default)]
pub struct RecordingCue {
    plays: AtomicUsize,
}

impl RecordingCue {
    pub fn count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl CuePlayer for RecordingCue {
    fn play_cue(&self) -> Result<(), String> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCall {
    Foreground,
    AlwaysOnTop,
    Hint(GateHint),
    ClearInput,
    Release,
}

/// Window that remembers what was asked of it.
#[derive(Debug, Default)]
pub struct RecordingWindow {
    calls: Vec<WindowCall>,
}

impl RecordingWindow {
    pub fn calls(&self) -> Vec<WindowCall> {
        self.calls.clone()
    }
}

impl AlertWindow for RecordingWindow {
    fn request_foreground(&mut self) {
        self.calls.push(WindowCall::Foreground);
    }

    fn set_always_on_top(&mut self) {
        self.calls.push(WindowCall::AlwaysOnTop);
    }

    fn show_hint(&mut self, hint: GateHint) {
        self.calls.push(WindowCall::Hint(hint));
    }

    fn clear_input(&mut self) {
        self.calls.push(WindowCall::ClearInput);
    }

    fn release(&mut self) {
        self.calls.push(WindowCall::Release);
    }
}
