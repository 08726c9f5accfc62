//! Host loop: ticks the scheduler, fires its timers, and drives the UI.

use std::{
    io,
    thread::sleep,
    time::{Duration, Instant},
};

use chrono::{Local, TimeZone};
use clap::ArgMatches;
use crossterm::{
    cursor,
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use dropclock_lib::playback::player::Player;
use dropclock_lib::scheduler::{ArmDecision, Scheduler, TickReport};
use dropclock_lib::tools::timer::PendingTimers;
use dropclock_lib::tools::wake::WakeDetector;
use dropclock_lib::{Error, PlaybackError};
use log::{debug, error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::cli::config::{self, Settings};
use crate::controls;
use crate::logging::{self, LogBuffer};
use crate::ui;

const TICK_MS: u64 = 50;

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, Error> {
    info!("Starting dropclock");
    let settings = config::resolve(args)?;
    let Some(file_path) = args.get_one::<String>("INPUT") else {
        error!("No input file given");
        return Err(PlaybackError::NotLoaded.into());
    };
    let quiet = args.get_flag("quiet");

    let mut player = Player::new(file_path)?;
    player.set_volume(settings.volume);
    let mut scheduler = build_scheduler(&settings);
    info!(
        "Drop at {:.3}s, lead {} ms, sync {}",
        settings.sync.drop_offset_seconds(),
        settings.sync.lead_time_ms(),
        if settings.sync_enabled { "on" } else { "off" }
    );

    if quiet {
        return run_headless(player, scheduler);
    }

    let _raw_mode = RawModeGuard::enable().ok();
    let mut terminal = {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, EnterAlternateScreen, EnableFocusChange, cursor::Hide);
        Terminal::new(CrosstermBackend::new(stdout)).ok()
    };
    let stderr_capture = logging::capture_stderr(log_buffer.clone());

    let title = format!("dropclock  {}", player.path().display());
    let mut timers = PendingTimers::new();
    let mut wake = WakeDetector::default();

    loop {
        let report = tick(&mut scheduler, &mut timers, &mut wake, &mut player);

        if let Some(term) = terminal.as_mut() {
            let status = controls::status_text(controls::StatusArgs {
                player: player.status(),
                report: &report,
                scheduler: &scheduler,
                target_label: report.target_ms.and_then(local_label),
            });
            ui::draw_status(term, &title, &status, &log_buffer.snapshot());
        }

        if let Some(command) = controls::poll_command(poll_timeout(&timers)) {
            if !controls::apply(command, &mut player, &mut scheduler) {
                break;
            }
        }
    }

    // Restore the terminal state before exiting.
    drop(stderr_capture);
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableFocusChange, cursor::Show);
    }

    Ok(0)
}

/// Run without a terminal UI until the track has played through.
///
/// With sync off the track starts right away. With sync on the process waits
/// for the armed start; a missed window ends the run with exit code 1.
fn run_headless(mut player: Player, mut scheduler: Scheduler) -> Result<i32, Error> {
    let mut timers = PendingTimers::new();
    let mut wake = WakeDetector::default();

    if !scheduler.state().sync_enabled {
        player.play()?;
    }
    // There is no play key to press without a terminal.
    scheduler.on_audio_unlocked();

    loop {
        let report = tick(&mut scheduler, &mut timers, &mut wake, &mut player);

        if player.is_finished() && scheduler.pending().is_none() {
            info!("Playback finished");
            return Ok(0);
        }
        if matches!(report.decision, ArmDecision::MissedWindow { .. }) && !player.is_playing() {
            warn!("Start window for this midnight already passed; nothing to play");
            return Ok(1);
        }

        sleep(poll_timeout(&timers));
    }
}

fn build_scheduler(settings: &Settings) -> Scheduler {
    if settings.wait_for_play {
        Scheduler::with_unlock_gate(settings.sync, settings.sync_enabled)
    } else {
        Scheduler::new(settings.sync, settings.sync_enabled)
    }
}

/// One host iteration: wake check, scheduler tick, then due timers.
fn tick(
    scheduler: &mut Scheduler,
    timers: &mut PendingTimers,
    wake: &mut WakeDetector,
    player: &mut Player,
) -> TickReport {
    let now = Local::now();
    if wake.observe(Instant::now(), now.timestamp_millis()) {
        info!("Clock jump or wake-up detected; re-checking schedule");
        scheduler.on_visibility_restored();
    }

    let report = scheduler.on_tick(&now, timers);
    let dropped = timers.drop_superseded(scheduler.pending());
    if dropped > 0 {
        debug!("Dropped {} superseded start timer(s)", dropped);
    }
    for token in timers.take_due(Instant::now()) {
        let outcome = scheduler.on_timer_fired(token, player);
        if outcome.started() {
            info!("Playback started for midnight drop");
        }
    }
    report
}

/// Sleep no longer than one tick, and wake up for the next timer.
fn poll_timeout(timers: &PendingTimers) -> Duration {
    let tick = Duration::from_millis(TICK_MS);
    match timers.next_deadline() {
        Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(tick),
        None => tick,
    }
}

fn local_label(ms: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|time| time.format("%H:%M:%S%.3f").to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
