//! Display port for task announcements and live progress.
//!
//! The orchestrator never writes to the terminal itself; it calls a
//! [`ProgressDisplay`] so runs can be rendered, silenced or recorded.

mod recording;
mod terminal;

pub use recording::{DisplayEvent, RecordingDisplay};
pub use terminal::TerminalDisplay;

/// What the orchestrator tells the display when a task starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskAnnouncement<'a> {
    /// 1-based position of the task in the list
    pub position: usize,
    /// Number of tasks in the run
    pub total: usize,
    pub title: &'a str,
    /// Reason carried by the skip request that led to this task, if any
    pub skip_reason: Option<&'a str>,
}

impl TaskAnnouncement<'_> {
    /// Position label in the form `[2/5]`.
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("[{}/{}]", self.position, self.total)
    }

    /// Whether this task was reached through a skip.
    #[must_use]
    pub fn skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}

/// Rendering surface for a run.
pub trait ProgressDisplay: Send {
    /// A task is starting.
    fn announce_task(&mut self, announcement: &TaskAnnouncement<'_>);

    /// The active task reported new, non-empty activity text.
    fn update_progress(&mut self, text: &str);

    /// Stop showing activity: the task asked for quiet, or the run ended.
    fn clear(&mut self);
}

/// Display that renders nothing. Used for `--quiet` runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentDisplay;

impl ProgressDisplay for SilentDisplay {
    fn announce_task(&mut self, _announcement: &TaskAnnouncement<'_>) {}

    fn update_progress(&mut self, _text: &str) {}

    fn clear(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_label() {
        let announcement = TaskAnnouncement {
            position: 2,
            total: 5,
            title: "Bundle",
            skip_reason: Some("cached"),
        };
        assert_eq!(announcement.position_label(), "[2/5]");
        assert!(announcement.skipped());
    }
}
