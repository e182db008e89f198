mod app;
mod cli;
mod effects;
mod persistence;
mod render;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    imagegen_logging::initialize(cli.log_settings());

    match app::run(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(app::error_exit_status(&err))
        }
    }
}
