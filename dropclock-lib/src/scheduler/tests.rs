use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone};

use super::*;
use crate::error::PlaybackError;

#[derive(Default)]
struct RecordingTimers {
    armed: Vec<(Duration, TimerToken)>,
}

impl TimerHost for RecordingTimers {
    fn schedule_once(&mut self, delay: Duration, token: TimerToken) {
        self.armed.push((delay, token));
    }
}

#[derive(Default)]
struct FakePlayback {
    fail_start: bool,
    starts: usize,
    seeks: Vec<f64>,
}

impl Playback for FakePlayback {
    fn start(&mut self) -> Result<(), PlaybackError> {
        self.starts += 1;
        if self.fail_start {
            Err(PlaybackError::Output("autoplay blocked".to_string()))
        } else {
            Ok(())
        }
    }

    fn seek_to(&mut self, seconds: f64) {
        self.seeks.push(seconds);
    }
}

fn tz() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).expect("valid offset")
}

fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
    tz().with_ymd_and_hms(2026, 12, 31, h, m, s).unwrap()
}

fn scheduler() -> Scheduler {
    Scheduler::new(SyncConfig::new(210.0, 1200).unwrap(), true)
}

#[test]
fn future_target_arms_exactly_one_timer() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    let report = scheduler.on_tick(&at(23, 55, 0), &mut timers);

    assert_eq!(timers.armed.len(), 1);
    assert_eq!(timers.armed[0].0, Duration::from_millis(88_800));
    assert!(scheduler.state().armed);
    let expected_target = tz()
        .with_ymd_and_hms(2026, 12, 31, 23, 56, 28)
        .unwrap()
        .timestamp_millis()
        + 800;
    assert_eq!(report.target_ms, Some(expected_target));
    assert_eq!(report.countdown_ms, Some(300_000));
    assert!(matches!(
        report.decision,
        ArmDecision::Scheduled { delay_ms: 88_800, .. }
    ));
}

#[test]
fn repeated_ticks_while_armed_are_no_ops() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    scheduler.on_tick(&at(23, 55, 0), &mut timers);
    for second in 1..30 {
        let report = scheduler.on_tick(&at(23, 55, second), &mut timers);
        assert_eq!(report.decision, ArmDecision::AlreadyArmed);
    }

    assert_eq!(timers.armed.len(), 1);
}

#[test]
fn missed_window_arms_without_a_timer() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    let report = scheduler.on_tick(&at(23, 59, 0), &mut timers);

    assert!(timers.armed.is_empty());
    assert!(scheduler.state().armed);
    assert!(scheduler.pending().is_none());
    assert!(matches!(report.decision, ArmDecision::MissedWindow { .. }));
    assert_eq!(report.countdown_ms, Some(60_000));
}

#[test]
fn target_exactly_now_counts_as_missed() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();
    let now = tz()
        .with_ymd_and_hms(2026, 12, 31, 23, 56, 28)
        .unwrap()
        + chrono::Duration::milliseconds(800);

    let report = scheduler.on_tick(&now, &mut timers);

    assert!(timers.armed.is_empty());
    assert!(matches!(report.decision, ArmDecision::MissedWindow { .. }));
}

#[test]
fn offsets_far_beyond_a_day_miss_without_overflow() {
    let mut timers = RecordingTimers::default();
    for config in [
        SyncConfig::new(1e13, 0).unwrap(),
        SyncConfig::new(0.0, i64::MAX).unwrap(),
    ] {
        let mut scheduler = Scheduler::new(config, true);

        let report = scheduler.on_tick(&at(23, 55, 0), &mut timers);

        assert!(matches!(report.decision, ArmDecision::MissedWindow { .. }));
        assert_eq!(report.countdown_ms, Some(300_000));
    }
    assert!(timers.armed.is_empty());
}

#[test]
fn missed_window_stays_quiet_until_reset() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    scheduler.on_tick(&at(23, 59, 0), &mut timers);
    let report = scheduler.on_tick(&at(23, 59, 30), &mut timers);

    assert_eq!(report.decision, ArmDecision::AlreadyArmed);
    assert!(timers.armed.is_empty());
}

#[test]
fn disabled_sync_never_arms_and_hides_countdown() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    scheduler.on_sync_toggled(false);
    for minute in 0..5 {
        let report = scheduler.on_tick(&at(23, 50 + minute, 0), &mut timers);
        assert_eq!(report.decision, ArmDecision::SyncDisabled);
        assert_eq!(report.countdown_ms, None);
        assert!(report.boundary_ms.is_some());
    }

    assert!(timers.armed.is_empty());
    assert!(!scheduler.state().armed);
}

#[test]
fn toggle_on_then_tick_arms_once() {
    let mut scheduler = Scheduler::new(SyncConfig::new(210.0, 1200).unwrap(), false);
    let mut timers = RecordingTimers::default();

    scheduler.on_sync_toggled(true);
    scheduler.on_tick(&at(23, 50, 0), &mut timers);
    scheduler.on_tick(&at(23, 50, 1), &mut timers);

    assert_eq!(timers.armed.len(), 1);
}

#[test]
fn toggling_twice_is_safe_and_rearms() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    scheduler.on_tick(&at(23, 50, 0), &mut timers);
    scheduler.on_sync_toggled(true);
    scheduler.on_sync_toggled(true);
    assert!(!scheduler.state().armed);
    scheduler.on_tick(&at(23, 50, 1), &mut timers);

    assert_eq!(timers.armed.len(), 2);
    assert_eq!(scheduler.pending(), Some(timers.armed[1].1));
    assert_ne!(timers.armed[0].1, timers.armed[1].1);
}

#[test]
fn disabling_sync_clears_armed() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    scheduler.on_tick(&at(23, 50, 0), &mut timers);
    scheduler.on_sync_toggled(false);

    let state = scheduler.state();
    assert!(!state.sync_enabled);
    assert!(!state.armed);
}

#[test]
fn fire_starts_and_seeks_to_lead_time_once() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();
    let mut playback = FakePlayback::default();

    scheduler.on_tick(&at(23, 55, 0), &mut timers);
    let token = timers.armed[0].1;
    let outcome = scheduler.on_timer_fired(token, &mut playback);

    assert!(outcome.started());
    assert_eq!(playback.starts, 1);
    assert_eq!(playback.seeks.len(), 1);
    assert!((playback.seeks[0] - 1.2).abs() < 1e-9);
    assert!(!scheduler.state().armed);
    assert!(scheduler.pending().is_none());
}

#[test]
fn fire_after_disable_does_nothing() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();
    let mut playback = FakePlayback::default();

    scheduler.on_tick(&at(23, 55, 0), &mut timers);
    scheduler.on_sync_toggled(false);
    let outcome = scheduler.on_timer_fired(timers.armed[0].1, &mut playback);

    assert!(matches!(outcome, FireOutcome::Suppressed));
    assert_eq!(playback.starts, 0);
    assert!(playback.seeks.is_empty());
}

#[test]
fn failed_start_is_reported_without_seek_or_retry() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();
    let mut playback = FakePlayback {
        fail_start: true,
        ..Default::default()
    };

    scheduler.on_tick(&at(23, 55, 0), &mut timers);
    let outcome = scheduler.on_timer_fired(timers.armed[0].1, &mut playback);
    scheduler.on_tick(&at(23, 56, 29), &mut timers);

    assert!(matches!(outcome, FireOutcome::StartFailed(_)));
    assert_eq!(playback.starts, 1);
    assert!(playback.seeks.is_empty());
    assert_eq!(timers.armed.len(), 1);
}

#[test]
fn after_fire_the_same_boundary_is_not_rearmed() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();
    let mut playback = FakePlayback::default();

    scheduler.on_tick(&at(23, 55, 0), &mut timers);
    scheduler.on_timer_fired(timers.armed[0].1, &mut playback);
    let report = scheduler.on_tick(&at(23, 56, 29), &mut timers);

    assert!(matches!(report.decision, ArmDecision::MissedWindow { .. }));
    assert_eq!(timers.armed.len(), 1);
}

#[test]
fn visibility_restore_forces_reevaluation() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    scheduler.on_tick(&at(23, 59, 0), &mut timers);
    assert!(scheduler.state().armed);

    scheduler.on_visibility_restored();
    assert!(!scheduler.state().armed);

    let report = scheduler.on_tick(&at(23, 59, 1), &mut timers);
    assert!(matches!(report.decision, ArmDecision::MissedWindow { .. }));
    assert!(scheduler.state().armed);
}

#[test]
fn visibility_restore_with_open_window_rearms() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();

    scheduler.on_tick(&at(23, 40, 0), &mut timers);
    scheduler.on_visibility_restored();
    scheduler.on_tick(&at(23, 45, 0), &mut timers);

    assert_eq!(timers.armed.len(), 2);
    assert_eq!(scheduler.pending(), Some(timers.armed[1].1));
}

#[test]
fn stale_timer_does_not_consume_current_arm() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();
    let mut playback = FakePlayback::default();

    scheduler.on_tick(&at(23, 40, 0), &mut timers);
    scheduler.on_visibility_restored();
    scheduler.on_tick(&at(23, 45, 0), &mut timers);

    let stale = timers.armed[0].1;
    let outcome = scheduler.on_timer_fired(stale, &mut playback);

    // Sync is still on, so the stale fire acts; the live arm is untouched.
    assert!(outcome.started());
    assert!(scheduler.state().armed);
    assert_eq!(scheduler.pending(), Some(timers.armed[1].1));
}

#[test]
fn unlock_gate_blocks_arming_until_unlocked() {
    let mut scheduler = Scheduler::with_unlock_gate(SyncConfig::new(210.0, 1200).unwrap(), true);
    let mut timers = RecordingTimers::default();

    let report = scheduler.on_tick(&at(23, 50, 0), &mut timers);
    assert_eq!(report.decision, ArmDecision::AwaitingUnlock);
    assert!(report.countdown_ms.is_some());
    assert!(timers.armed.is_empty());
    assert!(!scheduler.state().armed);

    scheduler.on_audio_unlocked();
    scheduler.on_tick(&at(23, 50, 1), &mut timers);
    assert_eq!(timers.armed.len(), 1);
}

#[test]
fn armed_implies_enabled_across_event_orders() {
    let mut scheduler = scheduler();
    let mut timers = RecordingTimers::default();
    let mut playback = FakePlayback::default();

    scheduler.on_tick(&at(23, 50, 0), &mut timers);
    let first = timers.armed[0].1;
    scheduler.on_sync_toggled(false);
    scheduler.on_tick(&at(23, 50, 1), &mut timers);
    scheduler.on_visibility_restored();
    scheduler.on_timer_fired(first, &mut playback);
    scheduler.on_tick(&at(23, 50, 2), &mut timers);

    let state = scheduler.state();
    assert!(!state.armed || state.sync_enabled);
    assert_eq!(timers.armed.len(), 1);
    assert_eq!(playback.starts, 0);
}
