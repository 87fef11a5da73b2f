use std::fmt;

use crate::context::SharedContext;
use crate::orchestrator::Controller;
use crate::progress::ProgressSource;

/// Function that starts a task's work and returns its event stream.
pub type TaskFn = Box<dyn FnMut(SharedContext, Controller) -> ProgressSource + Send>;

/// A named unit of work, identified by its position in the task list.
pub struct Task {
    title: String,
    work: TaskFn,
}

impl Task {
    /// Create a task from a title and a task function.
    ///
    /// The function receives the run's [`SharedContext`] and a [`Controller`]
    /// bound to this task, and must return a fresh [`ProgressSource`] on every call.
    pub fn new<F>(title: impl Into<String>, work: F) -> Self
    where
        F: FnMut(SharedContext, Controller) -> ProgressSource + Send + 'static,
    {
        Self {
            title: title.into(),
            work: Box::new(work),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn invoke(&mut self, context: SharedContext, controller: Controller) -> ProgressSource {
        (self.work)(context, controller)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}
