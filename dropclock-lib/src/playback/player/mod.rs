//! High-level playback controller backed by rodio.

mod controls;
mod output;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use rodio::{Decoder, Source};

use crate::error::PlaybackError;
use crate::playback::volume::VolumeControl;
use crate::playback::Playback;

use output::Output;

/// Coarse transport state for UI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
    Finished,
}

/// Snapshot of transport state for the status display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStatus {
    pub state: PlayerState,
    pub time: f64,
    pub duration: f64,
    pub volume: f32,
    pub muted: bool,
}

/// Single-track player.
///
/// The output device is opened lazily on the first `play`/`seek`, so building
/// a `Player` only probes the file. All calls are expected from one thread.
pub struct Player {
    path: PathBuf,
    duration: Option<Duration>,
    volume: VolumeControl,
    output: Option<Output>,
    has_played: bool,
}

impl Player {
    /// Probe `path` and create a player for it.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Open`] if the file cannot be read and
    /// [`PlaybackError::Decode`] if no decoder accepts it.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, PlaybackError> {
        let path = path.as_ref().to_path_buf();
        let decoder = open_decoder(&path)?;
        let duration = decoder.total_duration();
        info!(
            "Loaded {} ({})",
            path.display(),
            duration
                .map(|d| format!("{:.1}s", d.as_secs_f64()))
                .unwrap_or_else(|| "unknown length".to_string())
        );

        Ok(Self {
            path,
            duration,
            volume: VolumeControl::default(),
            output: None,
            has_played: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current transport snapshot.
    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.state(),
            time: self.get_time(),
            duration: self.get_duration(),
            volume: self.volume.volume(),
            muted: self.volume.is_muted(),
        }
    }

    pub fn state(&self) -> PlayerState {
        match self.output.as_ref() {
            None => PlayerState::Idle,
            Some(output) if output.sink.empty() => {
                if self.has_played {
                    PlayerState::Finished
                } else {
                    PlayerState::Idle
                }
            }
            Some(output) if output.sink.is_paused() => PlayerState::Paused,
            Some(_) => PlayerState::Playing,
        }
    }
}

impl Playback for Player {
    fn start(&mut self) -> Result<(), PlaybackError> {
        self.play()
    }

    fn seek_to(&mut self, seconds: f64) {
        self.seek(seconds);
    }
}

pub(crate) fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path)?;
    Decoder::new(BufReader::new(file)).map_err(|err| PlaybackError::Decode(err.to_string()))
}
