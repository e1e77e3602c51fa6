//! Password-gated alerts and their repeating audio cue.

mod cue;
mod gate;

pub use cue::{CuePlayer, FallbackCue};
pub use gate::{AlertGate, AlertSession, AlertWindow, GateHint, GateState, SessionId, SubmitOutcome};
