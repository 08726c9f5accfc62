//! Midnight drop scheduler.
//!
//! The [`Scheduler`] owns the single "is a start armed" decision. The host
//! drives it with explicit calls: [`Scheduler::on_tick`] from its frame/tick
//! loop, [`Scheduler::on_timer_fired`] when a one-shot timer it was asked to
//! arm elapses, [`Scheduler::on_sync_toggled`] from the sync switch, and
//! [`Scheduler::on_visibility_restored`] after the process was backgrounded or
//! asleep. Timers are never cancelled: a disabled sync makes a late fire a
//! no-op, and each arm carries a generation token so a superseded timer cannot
//! consume the current one.

mod state;

use std::time::Duration;

use chrono::{DateTime, TimeZone};
use log::{debug, info, warn};

use crate::clock::{ms_until, next_midnight, target_start};
use crate::config::SyncConfig;
use crate::playback::Playback;

pub use state::{ArmDecision, FireOutcome, ScheduleState, TickReport, TimerToken};

/// Host facility for one-shot delayed callbacks.
///
/// The host must hand `token` back through [`Scheduler::on_timer_fired`] once
/// `delay` has elapsed.
pub trait TimerHost {
    fn schedule_once(&mut self, delay: Duration, token: TimerToken);
}

/// Arms at most one playback start per boundary.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SyncConfig,
    state: ScheduleState,
    generation: u64,
    pending: Option<TimerToken>,
}

impl Scheduler {
    pub fn new(config: SyncConfig, sync_enabled: bool) -> Self {
        Self {
            config,
            state: ScheduleState {
                sync_enabled,
                armed: false,
                unlocked: true,
            },
            generation: 0,
            pending: None,
        }
    }

    /// Like [`Scheduler::new`], but nothing is armed until
    /// [`Scheduler::on_audio_unlocked`] is called.
    pub fn with_unlock_gate(config: SyncConfig, sync_enabled: bool) -> Self {
        let mut scheduler = Self::new(config, sync_enabled);
        scheduler.state.unlocked = false;
        scheduler
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    /// Token of the timer the scheduler currently considers live, if any.
    pub fn pending(&self) -> Option<TimerToken> {
        self.pending
    }

    /// Re-evaluate the boundary and arm a start if needed.
    ///
    /// Safe to call at any cadence; while armed this only refreshes the
    /// countdown.
    ///
    /// # Arguments
    ///
    /// * `now` - Current local time.
    /// * `timers` - Where a one-shot timer is armed when the window is open.
    pub fn on_tick<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        timers: &mut dyn TimerHost,
    ) -> TickReport {
        let now_ms = now.timestamp_millis();
        let boundary_ms = next_midnight(now).map(|boundary| boundary.timestamp_millis());

        if !self.state.sync_enabled {
            return TickReport {
                boundary_ms,
                target_ms: None,
                countdown_ms: None,
                decision: ArmDecision::SyncDisabled,
            };
        }

        let Some(boundary_ms) = boundary_ms else {
            warn!("no local midnight after {}; nothing to schedule", now_ms);
            return TickReport {
                boundary_ms: None,
                target_ms: None,
                countdown_ms: None,
                decision: ArmDecision::NoBoundary,
            };
        };

        let target_ms = target_start(boundary_ms, &self.config);
        let decision = if self.state.armed {
            ArmDecision::AlreadyArmed
        } else if !self.state.unlocked {
            ArmDecision::AwaitingUnlock
        } else {
            self.arm(now_ms, target_ms, timers)
        };

        TickReport {
            boundary_ms: Some(boundary_ms),
            target_ms: Some(target_ms),
            countdown_ms: Some(ms_until(boundary_ms, now_ms)),
            decision,
        }
    }

    fn arm(&mut self, now_ms: i64, target_ms: i64, timers: &mut dyn TimerHost) -> ArmDecision {
        self.state.armed = true;

        if target_ms <= now_ms {
            self.pending = None;
            debug!(
                "start window missed by {} ms; waiting for a reset",
                now_ms - target_ms
            );
            return ArmDecision::MissedWindow { target_ms };
        }

        self.generation += 1;
        let token = TimerToken(self.generation);
        let delay_ms = (target_ms - now_ms) as u64;
        timers.schedule_once(Duration::from_millis(delay_ms), token);
        self.pending = Some(token);
        info!("Armed drop start in {} ms ({:?})", delay_ms, token);

        ArmDecision::Scheduled {
            target_ms,
            delay_ms,
            token,
        }
    }

    /// Handle an elapsed one-shot timer.
    ///
    /// Consumes the arm when `token` is the live timer. Starts playback and
    /// seeks to the lead-time offset if sync is still enabled; a failed start
    /// is logged and not retried.
    pub fn on_timer_fired(&mut self, token: TimerToken, playback: &mut dyn Playback) -> FireOutcome {
        if self.pending == Some(token) {
            self.pending = None;
            self.state.armed = false;
        } else {
            debug!("stale timer {:?} fired", token);
        }

        if !self.state.sync_enabled {
            debug!("sync disabled; timer {:?} ignored", token);
            return FireOutcome::Suppressed;
        }

        match playback.start() {
            Ok(()) => {
                let seek_to = self.config.early_seek_seconds();
                playback.seek_to(seek_to);
                info!("Drop start fired, seeked to {:.3}s", seek_to);
                FireOutcome::Started { seek_to }
            }
            Err(err) => {
                warn!("Auto play failed: {}", err);
                FireOutcome::StartFailed(err)
            }
        }
    }

    /// Apply the sync switch and force the next tick to re-evaluate.
    pub fn on_sync_toggled(&mut self, enabled: bool) {
        self.state.sync_enabled = enabled;
        self.state.armed = false;
        info!("Midnight sync {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Force re-evaluation after the host may have throttled or skipped timers.
    pub fn on_visibility_restored(&mut self) {
        if self.state.armed {
            debug!("visibility restored; re-evaluating schedule");
        }
        self.state.armed = false;
    }

    /// Open the unlock gate. Has no effect on an ungated scheduler.
    pub fn on_audio_unlocked(&mut self) {
        if !self.state.unlocked {
            info!("Audio unlocked; midnight start may now be armed");
        }
        self.state.unlocked = true;
    }
}

#[cfg(test)]
mod tests;
