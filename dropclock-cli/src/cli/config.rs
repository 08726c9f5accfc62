//! Layered settings: defaults, then a JSON file, then the environment, then flags.

use std::fs;
use std::path::Path;

use clap::ArgMatches;
use dropclock_lib::config::{SyncConfig, DEFAULT_DROP_AT_SECS, DEFAULT_LEAD_TIME_MS};
use dropclock_lib::playback::volume::DEFAULT_VOLUME;
use dropclock_lib::ConfigError;
use log::debug;
use serde::Deserialize;

pub const ENV_DROP_AT: &str = "DROPCLOCK_DROP_AT";
pub const ENV_LEAD_MS: &str = "DROPCLOCK_LEAD_MS";

/// Optional values read from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub drop_at_secs: Option<f64>,
    pub lead_time_ms: Option<i64>,
    pub sync: Option<bool>,
    pub volume: Option<f32>,
    pub wait_for_play: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sync: SyncConfig,
    pub sync_enabled: bool,
    pub wait_for_play: bool,
    /// 0.0-1.0
    pub volume: f32,
}

/// Resolve settings from the process environment and `args`.
pub fn resolve(args: &ArgMatches) -> Result<Settings, ConfigError> {
    resolve_with_env(args, |name| std::env::var(name).ok())
}

/// Resolve settings with an injectable environment lookup.
pub fn resolve_with_env(
    args: &ArgMatches,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let file = match args.get_one::<String>("config") {
        Some(path) => {
            debug!("loading config from {}", path);
            FileConfig::load(Path::new(path))?
        }
        None => FileConfig::default(),
    };

    let mut drop_at = file.drop_at_secs.unwrap_or(DEFAULT_DROP_AT_SECS);
    let mut lead_ms = file.lead_time_ms.unwrap_or(DEFAULT_LEAD_TIME_MS);
    let mut volume = file.volume.unwrap_or(DEFAULT_VOLUME);

    if let Some(value) = env(ENV_DROP_AT) {
        drop_at = parse_field("drop offset", &value)?;
    }
    if let Some(value) = env(ENV_LEAD_MS) {
        lead_ms = parse_field("lead time", &value)?;
    }

    if let Some(value) = arg_value(args, "drop-at") {
        drop_at = parse_field("drop offset", value)?;
    }
    if let Some(value) = arg_value(args, "lead-ms") {
        lead_ms = parse_field("lead time", value)?;
    }
    if let Some(value) = arg_value(args, "GAIN") {
        let percent: f32 = parse_field("volume", value)?;
        volume = percent / 100.0;
    }

    let sync_enabled = !flag(args, "no-sync") && file.sync.unwrap_or(true);
    let wait_for_play = flag(args, "wait-for-play") || file.wait_for_play.unwrap_or(false);

    Ok(Settings {
        sync: SyncConfig::new(drop_at, lead_ms)?,
        sync_enabled,
        wait_for_play,
        volume,
    })
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Parse {
        field,
        value: value.to_string(),
    })
}

// The schedule subcommand does not define every play-only argument.
fn arg_value<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a String> {
    args.try_get_one::<String>(id).ok().flatten()
}

fn flag(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}
