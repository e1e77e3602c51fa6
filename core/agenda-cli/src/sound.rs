//! Cue players for the terminal front end.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use agenda_core::alert::{CuePlayer, FallbackCue};

/// Plays a sound file through the platform's command-line player. The player
/// runs as a detached child so a cue never blocks the caller.
pub struct FileCue {
    asset: PathBuf,
}

impl FileCue {
    pub fn new(asset: impl Into<PathBuf>) -> Self {
        Self {
            asset: asset.into(),
        }
    }

    fn command(&self) -> Command {
        #[cfg(target_os = "macos")]
        let cmd = {
            let mut cmd = Command::new("afplay");
            cmd.arg(&self.asset);
            cmd
        };

        #[cfg(target_os = "windows")]
        let cmd = {
            let mut cmd = Command::new("powershell");
            cmd.arg("-NoProfile").arg("-Command").arg(format!(
                "(New-Object Media.SoundPlayer '{}').PlaySync()",
                self.asset.display()
            ));
            cmd
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let cmd = {
            let mut cmd = Command::new("paplay");
            cmd.arg(&self.asset);
            cmd
        };

        cmd
    }
}

impl CuePlayer for FileCue {
    fn play_cue(&self) -> Result<(), String> {
        if !self.asset.is_file() {
            return Err(format!("Cue asset not found: {}", self.asset.display()));
        }
        self.command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("Failed to start sound player: {}", e))?;
        Ok(())
    }
}

/// Terminal bell on stderr.
pub struct BellCue;

impl CuePlayer for BellCue {
    fn play_cue(&self) -> Result<(), String> {
        let mut err = io::stderr();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| format!("Failed to ring bell: {}", e))
    }
}

/// The cue chain: configured asset if any, then the bell.
pub fn cue_player(asset: Option<PathBuf>) -> Arc<dyn CuePlayer> {
    match asset {
        Some(path) => Arc::new(FallbackCue::new(Box::new(FileCue::new(path)), Box::new(BellCue))),
        None => Arc::new(BellCue),
    }
}
