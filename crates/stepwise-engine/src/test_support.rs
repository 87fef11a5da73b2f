//! Task builders and fixtures for tests.
//!
//! Enabled for this crate's unit tests and, through the `test-utils` feature,
//! for integration tests of dependent crates.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stepwise_utils::error::TaskError;

use crate::display::RecordingDisplay;
use crate::orchestrator::Orchestrator;
use crate::progress::ProgressSource;
use crate::task::Task;

/// Task that succeeds without progress.
pub fn succeeding(title: &str) -> Task {
    Task::new(title, |_, _| ProgressSource::completed())
}

/// Task that fails with `message`.
pub fn failing(title: &str, message: &str) -> Task {
    let message = message.to_string();
    Task::new(title, move |_, _| {
        ProgressSource::failed(TaskError::new(message.clone()))
    })
}

/// Task that emits `values` as progress, then succeeds.
pub fn emitting(title: &str, values: &[&str]) -> Task {
    let values: Vec<String> = values.iter().map(ToString::to_string).collect();
    Task::new(title, move |_, _| ProgressSource::from_progress(values.clone()))
}

/// Task that writes `key = value` into the context, then succeeds.
pub fn writing(title: &str, key: &str, value: &str) -> Task {
    let (key, value) = (key.to_string(), value.to_string());
    Task::new(title, move |ctx, _| {
        ctx.insert(key.clone(), value.clone());
        ProgressSource::completed()
    })
}

/// Wraps a task so every invocation bumps the returned counter.
pub fn counted(mut task: Task) -> (Task, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let title = task.title().to_string();
    let wrapped = Task::new(title, move |ctx, controller| {
        counter.fetch_add(1, Ordering::SeqCst);
        task.invoke(ctx, controller)
    });
    (wrapped, calls)
}

/// Orchestrator wired to a [`RecordingDisplay`]; the returned display shares
/// its log with the orchestrator's.
pub fn recording_orchestrator(tasks: Vec<Task>) -> (Orchestrator, RecordingDisplay) {
    let display = RecordingDisplay::new();
    (Orchestrator::with_display(tasks, display.clone()), display)
}
