mod cli;
mod hints;
mod logging;
mod proxy;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.no_color);

    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error!("{e}");
            ExitCode::FAILURE
        }
    }
}
