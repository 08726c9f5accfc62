//! Playback collaborator seam and its rodio implementation.

pub mod player;
pub mod volume;

use crate::error::PlaybackError;

/// Minimal control surface the scheduler needs from a player.
pub trait Playback {
    /// Begin (or resume) playback. May fail, e.g. when no output device is available.
    fn start(&mut self) -> Result<(), PlaybackError>;

    /// Move the playhead to `seconds`.
    fn seek_to(&mut self, seconds: f64);
}
