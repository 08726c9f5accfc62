use std::time::{Duration, Instant};

use crate::scheduler::{TimerHost, TimerToken};

/// One-shot timers on the monotonic clock, polled by the host loop.
///
/// Deadlines use [`Instant`], which does not advance while the machine is
/// suspended on every platform; that is why the host also watches for wake-ups
/// and resets the scheduler.
#[derive(Debug, Default)]
pub struct PendingTimers {
    entries: Vec<(Instant, TimerToken)>,
}

impl PendingTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, deadline: Instant, token: TimerToken) {
        self.entries.push((deadline, token));
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerToken> {
        let mut due: Vec<(Instant, TimerToken)> = Vec::new();
        self.entries.retain(|entry| {
            if entry.0 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|entry| entry.0);
        due.into_iter().map(|entry| entry.1).collect()
    }

    /// Drop every queued timer other than `live`, returning how many went.
    ///
    /// A superseded timer would only start the track again, and after a
    /// suspend its monotonic deadline can land past midnight.
    pub fn drop_superseded(&mut self, live: Option<TimerToken>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| Some(entry.1) == live);
        before - self.entries.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.0).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TimerHost for PendingTimers {
    fn schedule_once(&mut self, delay: Duration, token: TimerToken) {
        self.schedule_at(Instant::now() + delay, token);
    }
}
