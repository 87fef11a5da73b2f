//! CLI argument definitions and parsing structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// stepwise - run tasks one at a time with live progress
#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(about = "Run an ordered list of tasks one at a time with live progress")]
#[command(long_about = r#"
stepwise runs the tasks of a pipeline file strictly in order. Each task is a shell
command; its stdout lines are shown as progress, and its last line can be captured
into a context shared with later tasks.

EXAMPLES:
  # Run ./stepwise.toml
  stepwise run

  # Run another pipeline and print the final context as JSON
  stepwise run ci/release.toml --json

  # Validate a pipeline without running it
  stepwise check ci/release.toml

  # Show the effective configuration and where each value came from
  stepwise config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is discovered by searching upward from CWD for .stepwise/config.toml
  Use --config to specify an explicit config file path
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Echo every progress line and enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Hide task announcements and the spinner
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every task of a pipeline in order
    ///
    /// EXAMPLES:
    ///   stepwise run
    ///   stepwise run deploy.toml --shell bash --json
    Run {
        /// Pipeline file (default: [pipeline] file from config, else stepwise.toml)
        pipeline: Option<PathBuf>,

        /// Print the final context as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Shell used to run commands (default: sh)
        #[arg(long)]
        shell: Option<String>,
    },

    /// Validate a pipeline file and list its tasks
    Check {
        /// Pipeline file (default: [pipeline] file from config, else stepwise.toml)
        pipeline: Option<PathBuf>,

        /// Output the task list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration with the source of each value
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Operation name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run { .. } => "run",
            Self::Check { .. } => "check",
            Self::Config { .. } => "config",
        }
    }
}

/// Build the clap command, for completions and help tests.
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
