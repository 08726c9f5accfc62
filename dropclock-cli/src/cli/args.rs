//! CLI argument definitions for `dropclock`.

use clap::{Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("dropclock")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Play a track so its drop lands on local midnight")
        .arg_required_else_help(true)
        .arg(
            Arg::new("drop-at")
                .long("drop-at")
                .short('d')
                .value_name("SECONDS")
                .global(true)
                .allow_negative_numbers(true)
                .help("Position of the drop in the track, in seconds [default: 210]"),
        )
        .arg(
            Arg::new("lead-ms")
                .long("lead-ms")
                .short('l')
                .value_name("MS")
                .global(true)
                .allow_negative_numbers(true)
                .help("Start this many ms early to absorb startup latency [default: 1200]"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .global(true)
                .help("JSON file with drop_at_secs, lead_time_ms, sync, volume, wait_for_play"),
        )
        .arg(
            Arg::new("GAIN")
                .long("volume")
                .short('g')
                .value_name("PERCENT")
                .help("Playback volume in percent [default: 85]"),
        )
        .arg(
            Arg::new("no-sync")
                .long("no-sync")
                .action(ArgAction::SetTrue)
                .help("Start with midnight sync switched off"),
        )
        .arg(
            Arg::new("wait-for-play")
                .long("wait-for-play")
                .action(ArgAction::SetTrue)
                .help("Do not arm the midnight start until play has been pressed once"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Run without the terminal UI"),
        )
        .arg(
            Arg::new("INPUT")
                .help("The audio file to play")
                .required(false)
                .index(1),
        )
        .subcommand(
            Command::new("schedule")
                .about("Print the next midnight, the start instant, and the countdown")
                .arg(
                    Arg::new("at")
                        .long("at")
                        .value_name("LOCAL_TIME")
                        .help("Evaluate at this local time (YYYY-MM-DDTHH:MM:SS) instead of now"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the schedule as JSON"),
                ),
        )
}
