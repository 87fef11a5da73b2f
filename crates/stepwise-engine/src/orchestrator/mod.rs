//! The run loop: one task at a time, strict lifecycle, single outcome.
//!
//! A run moves `ready → running → done | fail`. `pending` is part of the
//! lifecycle table but nothing in the run loop enters it.

mod controller;
mod outcome;

pub use controller::{Controller, Cursor, SkipDirective};
pub use outcome::Outcome;

use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info};

use stepwise_utils::error::{OrchestratorError, TaskError};
use stepwise_utils::logging::{
    log_stale_request, log_task_complete, log_task_error, log_task_skipped, log_task_start,
    task_span,
};
use stepwise_utils::types::RunState;

use crate::context::SharedContext;
use crate::display::{ProgressDisplay, SilentDisplay, TaskAnnouncement, TerminalDisplay};
use crate::progress::{ProgressSource, TaskEvent};
use crate::task::Task;
use controller::AdvanceRequest;
use outcome::OutcomeSlot;

/// Display flags for [`Orchestrator::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Echo every progress line
    pub verbose: bool,
    /// Render nothing
    pub quiet: bool,
    /// Allow ANSI styling when the terminal supports it
    pub color: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            color: true,
        }
    }
}

/// What the run loop does after a task stopped being active.
enum TaskStep {
    Completed,
    Advanced(Option<SkipDirective>),
    Failed(OrchestratorError),
}

enum Advance {
    Next(Option<SkipDirective>),
    Finished,
}

enum Signal {
    Request(AdvanceRequest),
    Event(Option<TaskEvent>),
}

/// Runs an ordered list of tasks, one at a time.
pub struct Orchestrator {
    tasks: Vec<Task>,
    context: SharedContext,
    index: usize,
    state: RunState,
    display: Box<dyn ProgressDisplay>,
    outcome: OutcomeSlot,
    requests_tx: mpsc::UnboundedSender<AdvanceRequest>,
    requests: mpsc::UnboundedReceiver<AdvanceRequest>,
    cursor: watch::Sender<Cursor>,
}

impl Orchestrator {
    /// Orchestrator rendering to the terminal, or to nothing when `quiet`.
    #[must_use]
    pub fn new(tasks: Vec<Task>, options: OrchestratorOptions) -> Self {
        if options.quiet {
            Self::with_display(tasks, SilentDisplay)
        } else {
            Self::with_display(tasks, TerminalDisplay::new(options.verbose, options.color))
        }
    }

    /// Orchestrator reporting to an explicit display.
    #[must_use]
    pub fn with_display<D>(tasks: Vec<Task>, display: D) -> Self
    where
        D: ProgressDisplay + 'static,
    {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let (cursor, _) = watch::channel(Cursor {
            index: 0,
            state: RunState::Ready,
        });

        Self {
            tasks,
            context: SharedContext::new(),
            index: 0,
            state: RunState::Ready,
            display: Box::new(display),
            outcome: OutcomeSlot::new(),
            requests_tx,
            requests,
            cursor,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The run's context. Before the run starts this is where callers seed
    /// initial entries.
    #[must_use]
    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    /// Controller acting on whichever task is active when it is used.
    ///
    /// Take it before calling [`run`](Self::run) to steer the run from
    /// another future.
    #[must_use]
    pub fn controller(&self) -> Controller {
        self.make_controller(None)
    }

    /// Run every task in order and return the outcome.
    ///
    /// # Errors
    /// - [`OrchestratorError::InvalidTransition`] when the run already started
    /// - [`OrchestratorError::TaskFailed`] when a task failed; later tasks never start
    pub async fn run(&mut self) -> Outcome {
        self.transition(RunState::Running)?;
        let started = Instant::now();
        info!(tasks = self.tasks.len(), "Run started");

        if self.tasks.is_empty() {
            self.complete()?;
        } else {
            let mut directive = None;
            loop {
                let next = match self.drive_task(directive).await {
                    TaskStep::Completed => self.advance(None)?,
                    TaskStep::Advanced(skip) => self.advance(skip)?,
                    TaskStep::Failed(err) => {
                        self.fail(err)?;
                        break;
                    }
                };
                match next {
                    Advance::Next(skip) => directive = skip,
                    Advance::Finished => break,
                }
            }
        }

        info!(
            state = %self.state,
            index = self.index,
            duration_ms = started.elapsed().as_millis(),
            "Run finished"
        );
        self.outcome.take()
    }

    fn advance(&mut self, directive: Option<SkipDirective>) -> Result<Advance, OrchestratorError> {
        if self.index >= self.tasks.len() {
            return Err(OrchestratorError::NoActiveTask { state: self.state });
        }

        self.index += 1;
        if self.index == self.tasks.len() {
            self.complete()?;
            return Ok(Advance::Finished);
        }

        self.publish();
        Ok(Advance::Next(directive))
    }

    fn complete(&mut self) -> Result<(), OrchestratorError> {
        self.transition(RunState::Done)?;
        self.display.clear();
        self.outcome.resolve(Ok(self.context.clone()))
    }

    fn fail(&mut self, err: OrchestratorError) -> Result<(), OrchestratorError> {
        self.transition(RunState::Fail)?;
        self.display.clear();
        self.outcome.resolve(Err(err))
    }

    fn transition(&mut self, to: RunState) -> Result<(), OrchestratorError> {
        if !self.state.can_transition_to(to) {
            return Err(OrchestratorError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        debug!(from = %self.state, to = %to, "State transition");
        self.state = to;
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        self.cursor.send_replace(Cursor {
            index: self.index,
            state: self.state,
        });
    }

    fn make_controller(&self, bound: Option<usize>) -> Controller {
        Controller::new(
            self.requests_tx.clone(),
            self.cursor.subscribe(),
            self.tasks.len(),
            bound,
        )
    }

    async fn drive_task(&mut self, directive: Option<SkipDirective>) -> TaskStep {
        let index = self.index;
        let total = self.tasks.len();
        let title = self.tasks[index].title().to_string();

        self.display.announce_task(&TaskAnnouncement {
            position: index + 1,
            total,
            title: &title,
            skip_reason: directive.as_ref().map(|d| d.reason.as_str()),
        });
        log_task_start(index, total, &title);

        let span = task_span(index, &title);
        let controller = self.make_controller(Some(index));
        let source = {
            let _entered = span.enter();
            self.tasks[index].invoke(self.context.clone(), controller)
        };

        self.watch_task(index, &title, source).instrument(span).await
    }

    async fn watch_task(&mut self, index: usize, title: &str, mut source: ProgressSource) -> TaskStep {
        let started = Instant::now();

        loop {
            let signal = tokio::select! {
                biased;
                Some(request) = self.requests.recv() => Signal::Request(request),
                event = source.next_event() => Signal::Event(event),
            };

            match signal {
                Signal::Request(request) if request.index != index => {
                    log_stale_request(request.index, index);
                }
                Signal::Request(AdvanceRequest {
                    directive: Some(directive),
                    ..
                }) => {
                    log_task_skipped(index, title, &directive.reason);
                    return TaskStep::Advanced(Some(directive));
                }
                Signal::Request(_) => {
                    debug!(task = index, "Task advanced by controller");
                    return TaskStep::Advanced(None);
                }
                Signal::Event(Some(TaskEvent::Progress(text))) => {
                    if text.is_empty() {
                        self.display.clear();
                    } else {
                        debug!(task = index, progress = %text, "Task progress");
                        self.display.update_progress(&text);
                    }
                }
                Signal::Event(Some(TaskEvent::Done)) => {
                    log_task_complete(index, title, started.elapsed().as_millis());
                    return TaskStep::Completed;
                }
                Signal::Event(Some(TaskEvent::Failed(err))) => {
                    return self.task_failed(index, title, err, started);
                }
                Signal::Event(None) => {
                    let err = TaskError::new("progress source closed without a terminal event");
                    return self.task_failed(index, title, err, started);
                }
            }
        }
    }

    fn task_failed(&self, index: usize, title: &str, err: TaskError, started: Instant) -> TaskStep {
        log_task_error(index, title, err.message(), started.elapsed().as_millis());
        TaskStep::Failed(OrchestratorError::TaskFailed {
            index,
            title: title.to_string(),
            source: err,
        })
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tasks", &self.tasks)
            .field("index", &self.index)
            .field("state", &self.state)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
