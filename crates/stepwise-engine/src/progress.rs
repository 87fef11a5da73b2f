//! Progress sources: the event stream a task hands back to the orchestrator.
//!
//! A task reports through a [`ProgressReporter`] and the orchestrator reads the
//! matching [`ProgressSource`]. Progress values may be sent any number of times;
//! the terminal methods ([`ProgressReporter::complete`], [`ProgressReporter::fail`])
//! consume the reporter, so a source carries at most one terminal event.

use std::future::Future;
use tokio::sync::mpsc;

use stepwise_utils::error::TaskError;

/// One event emitted by a task.
#[derive(Debug)]
pub enum TaskEvent {
    /// Current activity text. An empty string asks the display to go quiet.
    Progress(String),
    /// The task finished successfully.
    Done,
    /// The task failed; the run is aborted.
    Failed(TaskError),
}

impl TaskEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Cloneable sender for progress values only.
///
/// Handed to work started with [`ProgressSource::spawn`]; sends after the
/// orchestrator stopped listening (task finished or skipped) are dropped.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    events: mpsc::UnboundedSender<TaskEvent>,
}

impl ProgressHandle {
    /// Report the current activity. Returns false once nobody is listening.
    pub fn progress(&self, text: impl Into<String>) -> bool {
        self.events.send(TaskEvent::Progress(text.into())).is_ok()
    }

    /// Ask the display to stop showing activity text.
    pub fn quiet(&self) -> bool {
        self.progress(String::new())
    }

    /// Whether the orchestrator still reads this task's events.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        !self.events.is_closed()
    }
}

/// Write side of a progress source, owned by the task.
#[derive(Debug)]
pub struct ProgressReporter {
    handle: ProgressHandle,
}

impl ProgressReporter {
    pub fn progress(&self, text: impl Into<String>) -> bool {
        self.handle.progress(text)
    }

    pub fn quiet(&self) -> bool {
        self.handle.quiet()
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.handle.is_subscribed()
    }

    /// A progress-only sender that can outlive this reporter.
    #[must_use]
    pub fn handle(&self) -> ProgressHandle {
        self.handle.clone()
    }

    /// Terminal success event.
    pub fn complete(self) {
        let _ = self.handle.events.send(TaskEvent::Done);
    }

    /// Terminal failure event.
    pub fn fail(self, error: impl Into<TaskError>) {
        let _ = self.handle.events.send(TaskEvent::Failed(error.into()));
    }

    /// Emit the terminal event matching `result`.
    pub fn finish<E: Into<TaskError>>(self, result: Result<(), E>) {
        match result {
            Ok(()) => self.complete(),
            Err(err) => self.fail(err),
        }
    }
}

/// Read side of a task's event stream.
///
/// Sources are single-use: once a terminal event was read, [`next_event`](Self::next_event)
/// keeps returning `None`.
#[derive(Debug)]
pub struct ProgressSource {
    events: mpsc::UnboundedReceiver<TaskEvent>,
    terminated: bool,
}

impl ProgressSource {
    /// Create a connected reporter/source pair.
    #[must_use]
    pub fn channel() -> (ProgressReporter, ProgressSource) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reporter = ProgressReporter {
            handle: ProgressHandle { events: tx },
        };
        let source = ProgressSource {
            events: rx,
            terminated: false,
        };
        (reporter, source)
    }

    /// A source that succeeds without progress.
    #[must_use]
    pub fn completed() -> Self {
        Self::from_result(Ok::<(), TaskError>(()))
    }

    /// A source that fails immediately.
    #[must_use]
    pub fn failed(error: impl Into<TaskError>) -> Self {
        Self::from_result(Err(error))
    }

    /// A source whose only event is the terminal event for `result`.
    #[must_use]
    pub fn from_result<E: Into<TaskError>>(result: Result<(), E>) -> Self {
        let (reporter, source) = Self::channel();
        reporter.finish(result);
        source
    }

    /// A source that emits the given progress values, then succeeds.
    #[must_use]
    pub fn from_progress<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (reporter, source) = Self::channel();
        for value in values {
            reporter.progress(value);
        }
        reporter.complete();
        source
    }

    /// Run `work` on the Tokio runtime and report its result as the terminal event.
    ///
    /// The work keeps running if the task is skipped; only its events are
    /// discarded. Cancelling it is up to the task.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn spawn<F, Fut, E>(work: F) -> Self
    where
        F: FnOnce(ProgressHandle) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<TaskError> + Send + 'static,
    {
        let (reporter, source) = Self::channel();
        let fut = work(reporter.handle());
        tokio::spawn(async move {
            let result = fut.await;
            reporter.finish(result);
        });
        source
    }

    /// Wait for the next event.
    ///
    /// Returns `None` after the terminal event, or when every sender was dropped
    /// without one.
    pub async fn next_event(&mut self) -> Option<TaskEvent> {
        if self.terminated {
            return None;
        }

        let event = self.events.recv().await?;
        if event.is_terminal() {
            self.terminated = true;
            self.events.close();
        }
        Some(event)
    }

    /// Whether the terminal event has been read.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}
