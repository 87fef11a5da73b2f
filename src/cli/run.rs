//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, creates the tokio
//! runtime, dispatches to a command and handles all error output.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use super::args::{Cli, Commands};
use super::commands;

use crate::{CliArgs, Config, ExitCode, StepwiseError};
use stepwise_utils::logging::init_tracing;

/// Main CLI execution function.
///
/// Handles ALL output including errors. On error the message is printed
/// through `display_for_user()` and the matching exit code is returned;
/// `main` only maps it to the process exit status.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = build_cli_args(&cli);
    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            init_logging(cli.verbose);
            let err = StepwiseError::from(err);
            eprint!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    // Verbosity comes from every config layer, not only the flags.
    init_logging(config.verbose());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let operation = cli.command.name();
    debug!(operation, "Dispatching command");

    let result = rt.block_on(async {
        match cli.command {
            Commands::Run { json, .. } => commands::execute_run_command(json, &config).await,
            Commands::Check { json, .. } => commands::execute_check_command(json, &config),
            Commands::Config { json } => commands::execute_config_command(json, &config),
        }
    });

    if let Err(error) = result {
        if let Some(stepwise_error) = error.downcast_ref::<StepwiseError>() {
            eprint!("{}", stepwise_error.display_for_user());
            return Err(stepwise_error.to_exit_code());
        }

        eprintln!("✗ Unexpected error during '{operation}': {error:#}");
        eprintln!("\n  Run with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    if let Err(e) = init_tracing(verbose) {
        eprintln!("✗ Failed to initialize logging: {e}");
    }
}

/// Map parsed flags onto the configuration layer.
///
/// Flags that were not given stay `None` so file values still apply; `--quiet`
/// also turns a configured `verbose` off, and the other way round.
pub(crate) fn build_cli_args(cli: &Cli) -> CliArgs {
    let (pipeline_file, shell) = match &cli.command {
        Commands::Run {
            pipeline, shell, ..
        } => (pipeline.clone(), shell.clone()),
        Commands::Check { pipeline, .. } => (pipeline.clone(), None),
        Commands::Config { .. } => (None, None),
    };

    let (verbose, quiet) = match (cli.verbose, cli.quiet) {
        (true, _) => (Some(true), Some(false)),
        (false, true) => (Some(false), Some(true)),
        (false, false) => (None, None),
    };

    CliArgs {
        config_path: cli.config.clone(),
        verbose,
        quiet,
        color: cli.no_color.then_some(false),
        shell,
        pipeline_file,
    }
}
