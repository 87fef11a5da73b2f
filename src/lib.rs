//! stepwise - sequential task runner with a strict lifecycle and live progress
//!
//! stepwise runs an ordered list of tasks one at a time. Every task reports
//! progress while it works, may skip itself with a reason, and writes into a
//! context shared with the tasks after it. The run ends with exactly one
//! outcome: the final context, or the first failure.
//!
//! stepwise can be used in two ways:
//! - **CLI**: describe shell commands in a pipeline file and run `stepwise run`
//! - **Library**: build [`Task`] values in Rust and drive them with an [`Orchestrator`]
//!
//! # Quick Start (CLI)
//!
//! ```toml
//! # stepwise.toml
//! [[tasks]]
//! title = "Build"
//! command = "cargo build --release"
//!
//! [[tasks]]
//! title = "Version"
//! command = "git describe --tags"
//! capture = "version"
//! ```
//!
//! ```bash
//! stepwise check            # validate and list tasks
//! stepwise run --json       # run, then print the final context
//! stepwise config           # effective configuration with sources
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use stepwise::{Orchestrator, OrchestratorOptions, ProgressSource, Task};
//!
//! # async fn demo() -> Result<(), stepwise::StepwiseError> {
//! let tasks = vec![Task::new("Fetch", |ctx, _controller| {
//!     ProgressSource::spawn(move |progress| async move {
//!         progress.progress("downloading");
//!         ctx.insert("fetched", true);
//!         Ok::<_, std::io::Error>(())
//!     })
//! })];
//!
//! let context = Orchestrator::new(tasks, OrchestratorOptions::default())
//!     .run()
//!     .await?;
//! println!("{}", context.to_json());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod command;
pub mod pipeline;

pub use stepwise_config::{CliArgs, Config, ConfigBuilder, ConfigSource};
pub use stepwise_engine::{
    Controller, Orchestrator, OrchestratorOptions, Outcome, ProgressDisplay, ProgressHandle,
    ProgressReporter, ProgressSource, SharedContext, SkipDirective, Task, TaskEvent,
};
pub use stepwise_utils::error::{
    ConfigError, OrchestratorError, PipelineError, StepwiseError, TaskError, UserFriendlyError,
};
pub use stepwise_utils::exit_codes::ExitCode;
pub use stepwise_utils::types::RunState;

pub use pipeline::{PipelineFile, TaskSpec};

/// Display options taken from the effective configuration.
#[must_use]
pub fn orchestrator_options(config: &Config) -> OrchestratorOptions {
    OrchestratorOptions {
        verbose: config.verbose(),
        quiet: config.quiet(),
        color: config.color(),
    }
}

/// Run every task of `pipeline` with the shell and display settings of `config`.
///
/// # Errors
/// Returns [`StepwiseError::Orchestrator`] with the failing task when a
/// command fails.
pub async fn run_pipeline(
    pipeline: PipelineFile,
    config: &Config,
) -> Result<SharedContext, StepwiseError> {
    let tasks = pipeline.into_tasks(config.shell());
    let mut orchestrator = Orchestrator::new(tasks, orchestrator_options(config));
    Ok(orchestrator.run().await?)
}
