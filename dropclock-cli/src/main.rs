//! # Dropclock
//!
//! A command-line player that starts a track so its drop lands on local midnight.

use log::error;

mod cli;
mod controls;
mod logging;
mod runner;
mod ui;

fn main() {
    dotenv::dotenv().ok();
    let log_buffer = logging::init();
    let args = cli::args::build_cli().get_matches();

    let result = match args.subcommand() {
        Some(("schedule", sub_args)) => cli::schedule::run(sub_args),
        _ => runner::run(&args, log_buffer),
    };

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            let message = err.to_string().to_lowercase();
            error!("{}", message);
            eprintln!("error: {}", message);
            -1
        }
    };

    std::process::exit(code)
}
