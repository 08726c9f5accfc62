use std::time::{Duration, Instant};

/// Default tolerance before a tick gap counts as a wake-up.
pub const DEFAULT_WAKE_THRESHOLD: Duration = Duration::from_secs(2);

/// Detects that the process was suspended or its wall clock jumped.
///
/// Between two observations the monotonic and wall clocks should advance by
/// about the same amount, and the loop should not have stalled. Either
/// condition failing is treated like a tab becoming visible again.
#[derive(Debug, Clone)]
pub struct WakeDetector {
    threshold: Duration,
    last: Option<(Instant, i64)>,
}

impl WakeDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last: None,
        }
    }

    /// Record a tick and return true if a wake-up happened since the previous one.
    ///
    /// # Arguments
    ///
    /// * `mono` - Monotonic time of this tick.
    /// * `wall_ms` - Wall-clock epoch milliseconds of this tick.
    pub fn observe(&mut self, mono: Instant, wall_ms: i64) -> bool {
        let previous = self.last.replace((mono, wall_ms));
        let Some((last_mono, last_wall)) = previous else {
            return false;
        };

        let mono_ms = mono.saturating_duration_since(last_mono).as_millis() as i64;
        let wall_delta = wall_ms - last_wall;
        let threshold_ms = self.threshold.as_millis() as i64;

        mono_ms > threshold_ms || (wall_delta - mono_ms).abs() > threshold_ms
    }
}

impl Default for WakeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_WAKE_THRESHOLD)
    }
}
