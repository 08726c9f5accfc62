//! Host-side helpers: a polled one-shot timer queue and a wake-up detector.

pub mod timer;
pub mod wake;
