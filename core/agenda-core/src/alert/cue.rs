//! Audio cues for open alerts.
//!
//! Playing a cue is best-effort. [`FallbackCue`] tries the primary player,
//! then a simple tone, then gives up quietly. An alert never fails to show
//! because sound failed.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::gate::SessionId;

/// Something that can make a noise. Implementations should return quickly;
/// long playback belongs on the player's own thread or process.
pub trait CuePlayer: Send + Sync {
    fn play_cue(&self) -> Result<(), String>;
}

/// Primary player with a fallback tone.
pub struct FallbackCue {
    primary: Box<dyn CuePlayer>,
    fallback: Box<dyn CuePlayer>,
}

impl FallbackCue {
    pub fn new(primary: Box<dyn CuePlayer>, fallback: Box<dyn CuePlayer>) -> Self {
        Self { primary, fallback }
    }
}

impl CuePlayer for FallbackCue {
    fn play_cue(&self) -> Result<(), String> {
        let Err(primary_err) = self.primary.play_cue() else {
            return Ok(());
        };
        tracing::debug!(error = %primary_err, "Cue failed, using fallback tone");

        if let Err(e) = self.fallback.play_cue() {
            tracing::debug!(error = %e, "Fallback tone failed");
        }
        Ok(())
    }
}

/// Plays a cue and swallows any failure.
pub(crate) fn play_quietly(cue: &dyn CuePlayer) {
    if let Err(e) = cue.play_cue() {
        tracing::debug!(error = %e, "Cue failed");
    }
}

/// Liveness flag for one session. Cues check it under its lock, so once
/// [`CueToken::close`] returns no cue for that session can start.
pub(crate) struct CueToken {
    session: SessionId,
    open: Mutex<bool>,
}

impl CueToken {
    pub(crate) fn new(session: SessionId) -> Arc<Self> {
        Arc::new(Self {
            session,
            open: Mutex::new(true),
        })
    }

    /// Plays the cue if the session is still open. Returns false once closed.
    pub(crate) fn play_if_open(&self, cue: &dyn CuePlayer) -> bool {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if *open {
            play_quietly(cue);
        }
        *open
    }

    pub(crate) fn close(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub(crate) fn is_open(&self) -> bool {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Repeats a cue every `interval` until its session's token closes.
pub(crate) struct CueRepeater {
    token: Arc<CueToken>,
    thread: Option<JoinHandle<()>>,
}

impl CueRepeater {
    pub(crate) fn start(
        token: Arc<CueToken>,
        cue: Arc<dyn CuePlayer>,
        interval: Duration,
    ) -> Self {
        let worker_token = Arc::clone(&token);
        let spawned = thread::Builder::new()
            .name(format!("agenda-cue-{}", token.session))
            .spawn(move || loop {
                let deadline = Instant::now() + interval;
                loop {
                    if !worker_token.is_open() {
                        return;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    thread::park_timeout(deadline - now);
                }
                if !worker_token.play_if_open(cue.as_ref()) {
                    return;
                }
            });

        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                // The alert still works, it just won't nag.
                tracing::warn!(error = %e, session = %token.session, "Failed to start cue repeater");
                None
            }
        };

        Self { token, thread }
    }

    /// Closes the token and waits for the repeater to exit.
    pub(crate) fn stop(&mut self) {
        self.token.close();
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                tracing::warn!(session = %self.token.session, "Cue repeater panicked");
            }
        }
    }
}

impl Drop for CueRepeater {
    fn drop(&mut self) {
        self.stop();
    }
}
