//! Transport operations for `Player`.
//!
//! Play/pause/seek, volume and mute, and position/duration queries. Each
//! operation opens the output and re-queues the track on demand, so calls are
//! valid in any state (before the first play, after the track ended).

use std::time::Duration;

use log::{info, warn};

use crate::error::PlaybackError;

use super::output::Output;
use super::{open_decoder, Player, PlayerState};

impl Player {
    /// Start playback from the current position.
    ///
    /// Re-queues the track when it already played to the end.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        self.ensure_source()?;
        if let Some(output) = self.output.as_ref() {
            output.sink.play();
            self.has_played = true;
            info!("Playing audio");
        }
        Ok(())
    }

    /// Pause playback. No-op before the output is open.
    pub fn pause(&self) {
        if let Some(output) = self.output.as_ref() {
            output.sink.pause();
        }
    }

    /// Pause when playing, otherwise play.
    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Stop playback and drop the queued track.
    pub fn stop(&mut self) {
        if let Some(output) = self.output.as_ref() {
            output.sink.stop();
        }
        self.has_played = false;
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    /// Return true once a started track has played to the end.
    pub fn is_finished(&self) -> bool {
        self.state() == PlayerState::Finished
    }

    /// Current playhead in seconds.
    pub fn get_time(&self) -> f64 {
        self.output
            .as_ref()
            .map(|output| output.sink.get_pos().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Track length in seconds, or `0.0` when the container does not say.
    pub fn get_duration(&self) -> f64 {
        self.duration.map(|d| d.as_secs_f64()).unwrap_or(0.0)
    }

    /// Seek to `ts` seconds, clamped to the track.
    ///
    /// Keeps the current play/pause state. Failures are logged, not returned.
    ///
    /// # Arguments
    ///
    /// * `ts` - New playback position in seconds.
    pub fn seek(&mut self, ts: f64) {
        let mut target = if ts.is_finite() { ts.max(0.0) } else { 0.0 };
        if let Some(duration) = self.duration {
            target = target.min(duration.as_secs_f64());
        }

        let was_playing = self.is_playing();
        if let Err(err) = self.ensure_source() {
            warn!("seek to {:.2}s skipped: {}", target, err);
            return;
        }
        if let Some(output) = self.output.as_ref() {
            if let Err(err) = output.sink.try_seek(Duration::from_secs_f64(target)) {
                warn!("seek to {:.2}s failed: {}", target, err);
            }
            if !was_playing {
                output.sink.pause();
            }
        }
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta: f64) {
        let target = self.get_time() + delta;
        self.seek(target);
    }

    pub fn volume(&self) -> f32 {
        self.volume.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Set the playback volume (0.0-1.0).
    pub fn set_volume(&mut self, volume: f32) {
        self.volume.set_volume(volume);
        self.apply_gain();
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.volume.adjust(delta);
        self.apply_gain();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_gain();
    }

    fn apply_gain(&self) {
        if let Some(output) = self.output.as_ref() {
            output.sink.set_volume(self.volume.gain());
        }
    }

    /// Open the output if needed and queue the track when the sink is empty.
    fn ensure_source(&mut self) -> Result<(), PlaybackError> {
        if self.output.is_none() {
            self.output = Some(Output::open(self.volume.gain())?);
        }
        let output = self.output.as_ref().ok_or(PlaybackError::NotLoaded)?;
        if output.sink.empty() {
            let decoder = open_decoder(&self.path)?;
            output.sink.pause();
            output.sink.append(decoder);
        }
        Ok(())
    }
}
