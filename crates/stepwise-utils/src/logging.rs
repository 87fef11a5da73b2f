//! Logging and observability infrastructure for stepwise
//!
//! Structured `tracing` events for the task lifecycle, plus the subscriber
//! setup used by the CLI. Logs go to stderr so stdout stays free for the
//! final JSON context.

use tracing::{Level, debug, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize tracing subscriber for structured logging
///
/// `RUST_LOG` takes precedence. Otherwise verbose runs log orchestrator
/// internals at debug level and normal runs only surface warnings, since the
/// terminal display already reports task progress.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("stepwise=debug,stepwise_engine=debug,info")
            } else {
                EnvFilter::try_new("warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create a span covering one task invocation
#[must_use]
pub fn task_span(index: usize, title: &str) -> tracing::Span {
    span!(Level::INFO, "task", index = index, title = %title)
}

/// Log task start with structured fields
pub fn log_task_start(index: usize, total: usize, title: &str) {
    info!(index, total, title = %title, "Starting task");
}

/// Log task completion with duration
pub fn log_task_complete(index: usize, title: &str, duration_ms: u128) {
    info!(index, title = %title, duration_ms = %duration_ms, "Task completed");
}

/// Log a task being abandoned through a skip request
pub fn log_task_skipped(index: usize, title: &str, reason: &str) {
    info!(index, title = %title, reason = %reason, "Task skipped");
}

/// Log task failure with context
pub fn log_task_error(index: usize, title: &str, error: &str, duration_ms: u128) {
    error!(
        index,
        title = %title,
        duration_ms = %duration_ms,
        error = %error,
        "Task failed"
    );
}

/// Log a controller request that no longer targets the active task
pub fn log_stale_request(requested_for: usize, current: usize) {
    debug!(
        requested_for,
        current, "Ignoring advance request for a task that is no longer active"
    );
}
