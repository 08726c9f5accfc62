use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dropclock_lib::format::{format_countdown, format_position};
use dropclock_lib::playback::player::{Player, PlayerState, PlayerStatus};
use dropclock_lib::scheduler::{ArmDecision, Scheduler, TickReport};
use log::{info, warn};

const SEEK_STEP_SECS: f64 = 5.0;
const VOLUME_STEP: f32 = 0.05;

/// User or terminal input, already decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    ToggleSync,
    SeekBy(f64),
    VolumeBy(f32),
    ToggleMute,
    Resync,
    FocusRegained,
    Quit,
}

pub struct StatusSnapshot {
    pub playback: String,
    pub sync: String,
}

pub struct StatusArgs<'a> {
    pub player: PlayerStatus,
    pub report: &'a TickReport,
    pub scheduler: &'a Scheduler,
    pub target_label: Option<String>,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let player = args.player;
    let state = match player.state {
        PlayerState::Playing => "▶ Playing",
        PlayerState::Paused => "⏸ Paused",
        PlayerState::Finished => "■ Ended",
        PlayerState::Idle => "■ Stopped",
    };
    let percent = if player.duration > 0.0 {
        (player.time / player.duration * 100.0).min(100.0)
    } else {
        0.0
    };
    let volume = if player.muted {
        "muted".to_string()
    } else {
        format!("{:.0}%", player.volume * 100.0)
    };
    let playback = format!(
        "{}   {} / {}   ({:>5.1}%)\nVolume: {}",
        state,
        format_position(player.time),
        format_position(player.duration),
        percent,
        volume
    );

    let sync = match args.report.countdown_ms {
        None => "Sync off (press s to enable)".to_string(),
        Some(countdown) => format!(
            "Midnight in {}\nStart at {} | {}",
            format_countdown(countdown as i64),
            args.target_label.as_deref().unwrap_or("-"),
            sync_label(args.scheduler, args.report)
        ),
    };

    StatusSnapshot { playback, sync }
}

/// Short description of where the scheduler stands for this boundary.
pub fn sync_label(scheduler: &Scheduler, report: &TickReport) -> &'static str {
    let state = scheduler.state();
    match report.decision {
        ArmDecision::SyncDisabled => "off",
        ArmDecision::NoBoundary => "no boundary",
        ArmDecision::AwaitingUnlock => "waiting for first play",
        _ if state.armed && scheduler.pending().is_some() => "armed",
        _ if state.armed => "window missed (r to re-check)",
        _ => "evaluating",
    }
}

/// Wait up to `timeout` for input and decode it.
pub fn poll_command(timeout: Duration) -> Option<Command> {
    if !event::poll(timeout).unwrap_or(false) {
        return None;
    }
    match event::read() {
        Ok(Event::Key(key)) => map_key(key),
        Ok(Event::FocusGained) => Some(Command::FocusRegained),
        _ => None,
    }
}

pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePlay),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::ToggleSync),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Resync),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(Command::ToggleMute),
        KeyCode::Left => Some(Command::SeekBy(-SEEK_STEP_SECS)),
        KeyCode::Right => Some(Command::SeekBy(SEEK_STEP_SECS)),
        KeyCode::Up | KeyCode::Char('=') | KeyCode::Char('+') => Some(Command::VolumeBy(VOLUME_STEP)),
        KeyCode::Down | KeyCode::Char('-') => Some(Command::VolumeBy(-VOLUME_STEP)),
        _ => None,
    }
}

/// Apply a command. Returns false when the loop should exit.
pub fn apply(command: Command, player: &mut Player, scheduler: &mut Scheduler) -> bool {
    match command {
        Command::Quit => {
            player.stop();
            return false;
        }
        Command::TogglePlay => {
            scheduler.on_audio_unlocked();
            if let Err(err) = player.toggle() {
                warn!("Play failed: {}", err);
            }
        }
        Command::ToggleSync => {
            let enabled = !scheduler.state().sync_enabled;
            scheduler.on_sync_toggled(enabled);
        }
        Command::SeekBy(delta) => player.seek_by(delta),
        Command::VolumeBy(delta) => player.adjust_volume(delta),
        Command::ToggleMute => player.toggle_mute(),
        Command::Resync => {
            info!("Manual resync requested");
            scheduler.on_visibility_restored();
        }
        Command::FocusRegained => scheduler.on_visibility_restored(),
    }

    true
}
