// clipsmith-cli/src/main.rs
//
// Entry point for the `clipsmith` binary.
//
// Parses arguments, sets up logging (console plus an optional log file),
// dispatches to the command implementations and turns any error into
// `Error: <message>` on stderr with exit code 1.

use clap::Parser;
use clipsmith_cli::logging::prepare_log_file;
use clipsmith_cli::{Cli, CliResult, Commands, run_forge, run_profiles};
use clipsmith_core::logging::setup_logging;
use clipsmith_core::{CoreError, LogLevel};
use log::LevelFilter;

use std::path::Path;
use std::process;

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> CliResult<()> {
    setup_logging(level, log_file)
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Forge(args) => {
            // An invalid level is reported by request validation; log at the default meanwhile.
            let level: LogLevel = args.log_level.parse().unwrap_or_default();
            let log_file = args
                .log_dir
                .as_deref()
                .map(|dir| prepare_log_file(dir, "forge"))
                .transpose()?;
            init_logging(level.level_filter(), log_file.as_deref())?;
            if let Some(path) = &log_file {
                log::debug!("Logging to {}", path.display());
            }
            run_forge(args)
        }
        Commands::Profiles { id } => {
            init_logging(LevelFilter::Warn, None)?;
            run_profiles(id.as_deref())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::debug!("Exiting after error: {:?}", e);
        eprintln!("Error: {e}");
        if e.is_validation() {
            eprintln!("Run 'clipsmith forge --help' for the list of options.");
        }
        process::exit(1);
    }
}
