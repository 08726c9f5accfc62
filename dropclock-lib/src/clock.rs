//! Boundary and target-start arithmetic.
//!
//! Everything here is pure. Instants are epoch milliseconds in the same space
//! as `DateTime::timestamp_millis`, and the boundary is computed with the
//! caller's time zone so DST rules of the local calendar apply.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};

use crate::config::SyncConfig;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Return the first local midnight strictly after `now`.
///
/// When `now` is exactly midnight the following midnight is returned. On days
/// where midnight does not exist (DST gap) the first existing local instant of
/// that day is used instead. `None` only at the end of chrono's range.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    // Local dates only move forward, but an offset change can in theory put
    // the next day's start at or before `now`; keep stepping until it is later.
    for _ in 0..3 {
        day = day.succ_opt()?;
        if let Some(start) = start_of_day(&tz, day) {
            if start > *now {
                return Some(start);
            }
        }
    }
    None
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    for minute in 0..MINUTES_PER_DAY {
        let candidate = midnight + Duration::minutes(minute);
        if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
            return Some(resolved);
        }
    }
    None
}

/// Epoch-ms instant at which playback must begin for the drop to hit `boundary_ms`.
///
/// Not clamped: the result may already be in the past. Saturates at
/// `i64::MIN` rather than overflowing.
pub fn target_start(boundary_ms: i64, config: &SyncConfig) -> i64 {
    boundary_ms
        .saturating_sub(config.drop_offset_ms())
        .saturating_sub(config.lead_time_ms())
}

/// Milliseconds left until `boundary_ms`, floored at zero. Display only.
pub fn ms_until(boundary_ms: i64, now_ms: i64) -> u64 {
    boundary_ms.saturating_sub(now_ms).max(0) as u64
}
