//! Sync configuration: where the drop sits in the track and how early to start.

use crate::error::ConfigError;

/// Position (seconds) in the track that should land on midnight.
pub const DEFAULT_DROP_AT_SECS: f64 = 210.0;

/// How early (ms) to attempt starting playback ahead of the computed instant.
pub const DEFAULT_LEAD_TIME_MS: i64 = 1200;

/// Validated, immutable sync configuration.
///
/// The drop offset is held as whole milliseconds so target arithmetic is
/// exact integer math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    drop_offset_ms: i64,
    lead_time_ms: i64,
}

impl SyncConfig {
    /// Build a config, rejecting negative, non-finite or unrepresentable values.
    ///
    /// The offset in milliseconds and the sum of offset and lead time must both
    /// fit in an `i64`.
    ///
    /// # Arguments
    ///
    /// * `drop_offset_seconds` - Track position of the drop, in seconds.
    /// * `lead_time_ms` - Early-start buffer in milliseconds.
    pub fn new(drop_offset_seconds: f64, lead_time_ms: i64) -> Result<Self, ConfigError> {
        if !drop_offset_seconds.is_finite() {
            return Err(ConfigError::NonFinite("drop offset"));
        }
        if drop_offset_seconds < 0.0 {
            return Err(ConfigError::NegativeDropOffset(drop_offset_seconds));
        }
        if lead_time_ms < 0 {
            return Err(ConfigError::NegativeLeadTime(lead_time_ms));
        }

        let offset_ms = (drop_offset_seconds * 1000.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
        if offset_ms >= i64::MAX as f64 {
            return Err(ConfigError::OutOfRange("drop offset"));
        }
        let drop_offset_ms = offset_ms as i64;
        if drop_offset_ms.checked_add(lead_time_ms).is_none() {
            return Err(ConfigError::OutOfRange("drop offset plus lead time"));
        }

        Ok(Self {
            drop_offset_ms,
            lead_time_ms,
        })
    }

    pub fn drop_offset_ms(&self) -> i64 {
        self.drop_offset_ms
    }

    pub fn drop_offset_seconds(&self) -> f64 {
        self.drop_offset_ms as f64 / 1000.0
    }

    pub fn lead_time_ms(&self) -> i64 {
        self.lead_time_ms
    }

    /// Position to seek to once a scheduled start succeeds.
    pub fn early_seek_seconds(&self) -> f64 {
        (self.lead_time_ms as f64 / 1000.0).max(0.0)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            drop_offset_ms: (DEFAULT_DROP_AT_SECS * 1000.0) as i64,
            lead_time_ms: DEFAULT_LEAD_TIME_MS,
        }
    }
}
