//! `dgc` administrative entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use dgc_cli::{run, Cli};
use dgc_core::{default_log_level, init_logging, LogTarget};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(default_log_level(), LogTarget::Stderr) {
        eprintln!("logging disabled: {err}");
    }

    let stdout = io::stdout();
    match run(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
