//! Volume and mute bookkeeping, independent of the audio backend.

/// Volume used when nothing audible was ever saved.
pub const DEFAULT_VOLUME: f32 = 0.85;

/// Volume level plus mute state.
///
/// Muting keeps the last audible volume so unmuting can restore it, even when
/// the user dragged the volume down to zero in the meantime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeControl {
    volume: f32,
    muted: bool,
    saved: f32,
}

impl VolumeControl {
    pub fn new(volume: f32) -> Self {
        let volume = sanitize(volume);
        Self {
            volume,
            muted: false,
            saved: volume,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Muted, or audible but at zero volume.
    pub fn is_silent(&self) -> bool {
        self.muted || self.volume == 0.0
    }

    /// Gain to hand to the output sink.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Set the volume (clamped to `[0, 1]`) and remember it for unmute.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = sanitize(volume);
        self.saved = self.volume;
    }

    pub fn adjust(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    /// Flip between silent and audible.
    pub fn toggle_mute(&mut self) {
        if self.is_silent() {
            self.muted = false;
            self.volume = if self.saved > 0.0 {
                self.saved
            } else {
                DEFAULT_VOLUME
            };
        } else {
            self.saved = self.volume;
            self.muted = true;
        }
    }
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

fn sanitize(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        DEFAULT_VOLUME
    }
}
