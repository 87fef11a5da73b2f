use tokio::sync::oneshot;
use tracing::error;

use stepwise_utils::error::OrchestratorError;

use crate::context::SharedContext;

/// Result of a run: the final context, or the error that ended it.
pub type Outcome = Result<SharedContext, OrchestratorError>;

/// Single-delivery slot for a run's outcome.
#[derive(Debug)]
pub(crate) struct OutcomeSlot {
    sender: Option<oneshot::Sender<Outcome>>,
    receiver: Option<oneshot::Receiver<Outcome>>,
}

impl OutcomeSlot {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            sender: Some(sender),
            receiver: Some(receiver),
        }
    }

    pub(crate) fn resolve(&mut self, outcome: Outcome) -> Result<(), OrchestratorError> {
        let Some(sender) = self.sender.take() else {
            error!("Run outcome resolved twice");
            return Err(OrchestratorError::DoubleResolution);
        };
        // The receiver lives in this slot, so the send cannot fail while it is unread.
        sender
            .send(outcome)
            .map_err(|_| OrchestratorError::DoubleResolution)
    }

    pub(crate) fn take(&mut self) -> Outcome {
        self.receiver
            .take()
            .and_then(|mut receiver| receiver.try_recv().ok())
            .unwrap_or(Err(OrchestratorError::OutcomeUnresolved))
    }
}
