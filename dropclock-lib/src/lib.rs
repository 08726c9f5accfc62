//! # Dropclock Library
//!
//! Schedules playback of a track so that a chosen moment in it (the drop)
//! lands exactly on the next local midnight. It includes the clock math, the
//! scheduler state machine, a rodio-backed player, and the host helpers the
//! CLI uses to drive them.

pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod playback;
pub mod scheduler;
pub mod tools;

pub use error::{ConfigError, Error, PlaybackError};
