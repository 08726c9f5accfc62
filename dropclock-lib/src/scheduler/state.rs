//! Scheduler state and the values its operations report.

use crate::error::PlaybackError;

/// Generation of an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

/// Mutable scheduling state.
///
/// `armed` is only ever true while `sync_enabled` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    /// User intent from the sync switch.
    pub sync_enabled: bool,
    /// A decision was made for the current boundary (timer pending or window missed).
    pub armed: bool,
    /// Arming is allowed; false until the first manual play when gated.
    pub unlocked: bool,
}

/// What a tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmDecision {
    SyncDisabled,
    NoBoundary,
    AwaitingUnlock,
    AlreadyArmed,
    MissedWindow {
        target_ms: i64,
    },
    Scheduled {
        target_ms: i64,
        delay_ms: u64,
        token: TimerToken,
    },
}

/// Result of a tick, including what the countdown display needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub boundary_ms: Option<i64>,
    pub target_ms: Option<i64>,
    /// `None` while sync is disabled (countdown hidden).
    pub countdown_ms: Option<u64>,
    pub decision: ArmDecision,
}

/// Result of a timer fire.
#[derive(Debug)]
pub enum FireOutcome {
    Suppressed,
    Started { seek_to: f64 },
    StartFailed(PlaybackError),
}

impl FireOutcome {
    pub fn started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}
