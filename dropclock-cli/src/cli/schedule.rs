//! `dropclock schedule`: show what the scheduler would do at a given moment.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::ArgMatches;
use dropclock_lib::clock::{ms_until, next_midnight, target_start};
use dropclock_lib::config::SyncConfig;
use dropclock_lib::format::format_countdown;
use dropclock_lib::{ConfigError, Error};
use serde::Serialize;

use super::config;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Everything the scheduler would compute for one instant.
#[derive(Debug, Serialize)]
pub struct ScheduleSummary {
    pub now: String,
    pub boundary: String,
    /// Local start instant; `None` when it falls outside the calendar.
    pub target_start: Option<String>,
    pub countdown_ms: u64,
    /// Delay until the start would fire; `None` when the window is missed.
    pub delay_ms: Option<u64>,
    pub window_open: bool,
    pub drop_at_secs: f64,
    pub lead_time_ms: i64,
}

/// Build the summary for `now`, or `None` past the end of the calendar.
pub fn summarize<Tz: TimeZone>(now: &DateTime<Tz>, sync: &SyncConfig) -> Option<ScheduleSummary> {
    let boundary = next_midnight(now)?;
    let now_ms = now.timestamp_millis();
    let boundary_ms = boundary.timestamp_millis();
    let target_ms = target_start(boundary_ms, sync);
    let target = boundary.timezone().timestamp_millis_opt(target_ms).single();
    let window_open = target_ms > now_ms;

    Some(ScheduleSummary {
        now: now.naive_local().format(TIME_FORMAT).to_string(),
        boundary: boundary.naive_local().format(TIME_FORMAT).to_string(),
        target_start: target.map(|target| target.naive_local().format(TIME_FORMAT).to_string()),
        countdown_ms: ms_until(boundary_ms, now_ms),
        delay_ms: window_open.then(|| (target_ms - now_ms) as u64),
        window_open,
        drop_at_secs: sync.drop_offset_seconds(),
        lead_time_ms: sync.lead_time_ms(),
    })
}

pub fn run(args: &ArgMatches) -> Result<i32, Error> {
    let settings = config::resolve(args)?;
    let now = match args.get_one::<String>("at") {
        Some(value) => parse_local(value)?,
        None => Local::now(),
    };

    let Some(summary) = summarize(&now, &settings.sync) else {
        eprintln!("no local midnight after {}", now);
        return Ok(1);
    };

    if args.get_flag("json") {
        let json = serde_json::to_string_pretty(&summary).map_err(ConfigError::from)?;
        println!("{}", json);
    } else {
        print!("{}", render_text(&summary));
    }

    Ok(0)
}

fn render_text(summary: &ScheduleSummary) -> String {
    let status = match summary.delay_ms {
        Some(delay) => format!("open, starts in {}", format_countdown(delay as i64)),
        None => "missed, no start this midnight".to_string(),
    };
    format!(
        "now        {}\nmidnight   {}\nstart at   {}\ncountdown  {}\nwindow     {}\n",
        summary.now,
        summary.boundary,
        summary.target_start.as_deref().unwrap_or("-"),
        format_countdown(summary.countdown_ms as i64),
        status
    )
}

fn parse_local(value: &str) -> Result<DateTime<Local>, ConfigError> {
    let parse_error = || ConfigError::Parse {
        field: "local time",
        value: value.to_string(),
    };
    let naive = INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
        .ok_or_else(parse_error)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(parse_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 12, 31, h, m, s)
            .unwrap()
    }

    #[test]
    fn open_window_reports_delay_and_target() {
        let summary = summarize(&at(23, 55, 0), &SyncConfig::default()).expect("summary");
        assert_eq!(summary.boundary, "2027-01-01 00:00:00.000");
        assert_eq!(
            summary.target_start.as_deref(),
            Some("2026-12-31 23:56:28.800")
        );
        assert_eq!(summary.delay_ms, Some(88_800));
        assert_eq!(summary.countdown_ms, 300_000);
        assert!(summary.window_open);
    }

    #[test]
    fn missed_window_has_no_delay() {
        let summary = summarize(&at(23, 59, 0), &SyncConfig::default()).expect("summary");
        assert_eq!(summary.delay_ms, None);
        assert!(!summary.window_open);
        assert!(render_text(&summary).contains("missed"));
    }

    #[test]
    fn target_before_the_calendar_is_reported_not_computed() {
        let sync = SyncConfig::new(1e13, 0).expect("valid config");
        let summary = summarize(&at(23, 55, 0), &sync).expect("summary");
        assert_eq!(summary.target_start, None);
        assert_eq!(summary.delay_ms, None);
        assert!(!summary.window_open);
        assert!(render_text(&summary).contains("start at   -\n"));
    }

    #[test]
    fn text_render_lists_every_field() {
        let summary = summarize(&at(23, 55, 0), &SyncConfig::default()).expect("summary");
        let text = render_text(&summary);
        assert!(text.contains("start at   2026-12-31 23:56:28.800"));
        assert!(text.contains("countdown  5:00"));
        assert!(text.contains("open, starts in 1:28"));
    }

    #[test]
    fn parse_local_accepts_both_separators() {
        assert!(parse_local("2026-12-31T23:55:00").is_ok());
        assert!(parse_local("2026-12-31 23:55:00").is_ok());
        assert!(matches!(
            parse_local("tomorrow"),
            Err(ConfigError::Parse { field: "local time", .. })
        ));
    }
}
