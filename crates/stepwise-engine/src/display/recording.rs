use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ProgressDisplay, TaskAnnouncement};

/// One call received by a [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Announce {
        position: usize,
        total: usize,
        title: String,
        skip_reason: Option<String>,
    },
    Progress(String),
    Clear,
}

/// Display that records every call, for tests and for embedders that render
/// the run themselves after the fact.
///
/// Clones share the same log, so keep one clone and hand the other to the
/// orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl RecordingDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in call order.
    #[must_use]
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.log().clone()
    }

    /// Titles of announced tasks, in order.
    #[must_use]
    pub fn announced_titles(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Announce { title, .. } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    /// Progress texts, in order.
    #[must_use]
    pub fn progress_texts(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Progress(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn log(&self) -> MutexGuard<'_, Vec<DisplayEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressDisplay for RecordingDisplay {
    fn announce_task(&mut self, announcement: &TaskAnnouncement<'_>) {
        self.log().push(DisplayEvent::Announce {
            position: announcement.position,
            total: announcement.total,
            title: announcement.title.to_string(),
            skip_reason: announcement.skip_reason.map(str::to_string),
        });
    }

    fn update_progress(&mut self, text: &str) {
        self.log().push(DisplayEvent::Progress(text.to_string()));
    }

    fn clear(&mut self) {
        self.log().push(DisplayEvent::Clear);
    }
}
