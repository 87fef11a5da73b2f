use tokio::sync::{mpsc, watch};

use stepwise_utils::error::OrchestratorError;
use stepwise_utils::types::RunState;

/// Position and lifecycle state published by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub state: RunState,
}

/// Request to leave the task at `index`.
#[derive(Debug)]
pub(crate) struct AdvanceRequest {
    pub(crate) index: usize,
    pub(crate) directive: Option<SkipDirective>,
}

/// Reason attached to a skip; shown on the next task's announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDirective {
    pub reason: String,
}

impl SkipDirective {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Handle for steering a run from inside a task or from outside the run loop.
///
/// Controllers passed to task functions are bound to their task: once the run
/// moved on, their requests are rejected. A controller obtained from
/// [`Orchestrator::controller`](super::Orchestrator::controller) acts on
/// whichever task is active when the request is made.
#[derive(Debug, Clone)]
pub struct Controller {
    requests: mpsc::UnboundedSender<AdvanceRequest>,
    cursor: watch::Receiver<Cursor>,
    len: usize,
    bound: Option<usize>,
}

impl Controller {
    pub(crate) fn new(
        requests: mpsc::UnboundedSender<AdvanceRequest>,
        cursor: watch::Receiver<Cursor>,
        len: usize,
        bound: Option<usize>,
    ) -> Self {
        Self {
            requests,
            cursor,
            len,
            bound,
        }
    }

    /// Index of the active task (equals `len()` once the run is done).
    #[must_use]
    pub fn index(&self) -> usize {
        self.cursor.borrow().index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.cursor.borrow().state
    }

    /// Abandon the active task and move on, showing `reason` on the next
    /// announcement. The task's remaining events are discarded.
    ///
    /// # Errors
    /// Returns [`OrchestratorError::NoActiveTask`] when no task is running or
    /// this controller's task is no longer the active one.
    pub fn skip(&self, reason: impl Into<String>) -> Result<(), OrchestratorError> {
        self.request(Some(SkipDirective::new(reason)))
    }

    /// Move on without waiting for the active task's terminal event.
    ///
    /// # Errors
    /// Same conditions as [`skip`](Self::skip).
    pub fn next(&self) -> Result<(), OrchestratorError> {
        self.request(None)
    }

    /// Wait until the task at `index` is running.
    ///
    /// Returns `false` if the run ended or moved past `index` first.
    pub async fn wait_for_task(&self, index: usize) -> bool {
        let mut cursor = self.cursor.clone();
        match cursor
            .wait_for(|c| (c.state == RunState::Running && c.index >= index) || c.state.is_terminal())
            .await
        {
            Ok(c) => c.index == index && c.state == RunState::Running,
            Err(_) => false,
        }
    }

    fn request(&self, directive: Option<SkipDirective>) -> Result<(), OrchestratorError> {
        let Cursor { index, state } = *self.cursor.borrow();
        let target = self.bound.unwrap_or(index);

        if state != RunState::Running || target != index {
            return Err(OrchestratorError::NoActiveTask { state });
        }

        self.requests
            .send(AdvanceRequest {
                index: target,
                directive,
            })
            .map_err(|_| OrchestratorError::NoActiveTask { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(cursor: Cursor, bound: Option<usize>) -> (Controller, mpsc::UnboundedReceiver<AdvanceRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_cursor_tx, cursor_rx) = watch::channel(cursor);
        (Controller::new(tx, cursor_rx, 3, bound), rx)
    }

    #[test]
    fn test_skip_requires_running_state() {
        let (ctl, _rx) = controller(
            Cursor {
                index: 0,
                state: RunState::Ready,
            },
            None,
        );
        let err = ctl.skip("too early").unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::NoActiveTask {
                state: RunState::Ready
            }
        ));
    }

    #[test]
    fn test_bound_controller_rejects_other_task() {
        let (ctl, mut rx) = controller(
            Cursor {
                index: 2,
                state: RunState::Running,
            },
            Some(1),
        );
        assert!(ctl.next().is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_request_is_stamped_with_active_index() {
        let (ctl, mut rx) = controller(
            Cursor {
                index: 1,
                state: RunState::Running,
            },
            None,
        );
        ctl.skip("cached").unwrap();

        let request = rx.try_recv().unwrap();
        assert_eq!(request.index, 1);
        assert_eq!(request.directive, Some(SkipDirective::new("cached")));
        assert_eq!(ctl.len(), 3);
        assert_eq!(ctl.index(), 1);
    }
}
