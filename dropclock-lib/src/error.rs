//! Error types shared by the scheduler, the player, and the CLI.

use std::fmt::{Display, Formatter};

/// Rejected sync configuration.
#[derive(Debug)]
pub enum ConfigError {
    NegativeDropOffset(f64),
    NegativeLeadTime(i64),
    NonFinite(&'static str),
    OutOfRange(&'static str),
    Parse { field: &'static str, value: String },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeDropOffset(secs) => {
                write!(f, "drop offset must be >= 0 seconds, got {}", secs)
            }
            Self::NegativeLeadTime(ms) => write!(f, "lead time must be >= 0 ms, got {}", ms),
            Self::NonFinite(field) => write!(f, "{} must be a finite number", field),
            Self::OutOfRange(field) => write!(f, "{} is too large", field),
            Self::Parse { field, value } => write!(f, "invalid {}: {:?}", field, value),
            Self::Io(err) => write!(f, "config io error: {}", err),
            Self::Json(err) => write!(f, "config json error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Failure to open, decode, or start audio.
#[derive(Debug)]
pub enum PlaybackError {
    Open(std::io::Error),
    Decode(String),
    Output(String),
    NotLoaded,
}

impl Display for PlaybackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "could not open audio file: {}", err),
            Self::Decode(err) => write!(f, "decode error: {}", err),
            Self::Output(err) => write!(f, "audio output unavailable: {}", err),
            Self::NotLoaded => write!(f, "no track loaded"),
        }
    }
}

impl std::error::Error for PlaybackError {}

impl From<std::io::Error> for PlaybackError {
    fn from(value: std::io::Error) -> Self {
        Self::Open(value)
    }
}

/// Top-level error returned by the CLI entry points.
#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Playback(PlaybackError),
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{}", err),
            Self::Playback(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Playback(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<PlaybackError> for Error {
    fn from(value: PlaybackError) -> Self {
        Self::Playback(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
