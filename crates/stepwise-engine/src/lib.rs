//! Sequential task orchestration for stepwise
//!
//! This crate runs an ordered list of named tasks one at a time. Each task
//! hands back a [`ProgressSource`] that emits zero or more progress values and
//! then exactly one terminal event. The [`Orchestrator`] enforces the run
//! lifecycle (`ready → running → done | fail`), threads a [`SharedContext`]
//! through every task and reports progress to a [`ProgressDisplay`].
//!
//! # Example
//!
//! ```rust,no_run
//! use stepwise_engine::{Orchestrator, OrchestratorOptions, ProgressSource, Task};
//!
//! # async fn demo() -> Result<(), stepwise_utils::error::OrchestratorError> {
//! let tasks = vec![
//!     Task::new("Prepare", |ctx, _controller| {
//!         ctx.insert("prepared", true);
//!         ProgressSource::completed()
//!     }),
//!     Task::new("Build", |_ctx, _controller| {
//!         ProgressSource::spawn(|progress| async move {
//!             progress.progress("compiling");
//!             Ok::<_, std::io::Error>(())
//!         })
//!     }),
//! ];
//!
//! let mut orchestrator = Orchestrator::new(tasks, OrchestratorOptions::default());
//! let context = orchestrator.run().await?;
//! assert_eq!(context.get("prepared"), Some(serde_json::Value::Bool(true)));
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod display;
pub mod orchestrator;
pub mod progress;
pub mod task;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use context::SharedContext;
pub use display::{ProgressDisplay, SilentDisplay, TaskAnnouncement, TerminalDisplay};
pub use display::{DisplayEvent, RecordingDisplay};
pub use orchestrator::{Controller, Orchestrator, OrchestratorOptions, Outcome, SkipDirective};
pub use progress::{ProgressHandle, ProgressReporter, ProgressSource, TaskEvent};
pub use task::Task;
