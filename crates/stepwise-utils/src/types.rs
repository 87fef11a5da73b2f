//! Shared value types used across the stepwise crates.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

/// Lifecycle state of a task run.
///
/// A run starts in [`RunState::Ready`], moves to [`RunState::Running`] when it is
/// started and ends in one of the two terminal states, [`RunState::Done`] or
/// [`RunState::Fail`].
///
/// ```rust
/// use stepwise_utils::types::RunState;
///
/// assert!(RunState::Ready.can_transition_to(RunState::Running));
/// assert!(!RunState::Done.can_transition_to(RunState::Fail));
/// assert_eq!(RunState::Running.as_str(), "running");
/// ```
///
/// # Serialization
///
/// `RunState` serializes to its lowercase name (e.g. `"ready"`, `"done"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunState {
    /// Constructed, not started yet. Never re-entered.
    Ready,
    /// A task is active.
    Running,
    /// Hold state between tasks. Part of the transition table, never entered by the runner.
    Pending,
    /// Every task completed or was skipped.
    Done,
    /// A task failed and the run was aborted.
    Fail,
}

impl RunState {
    /// Returns the canonical lowercase name used in logs and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns true for `done` and `fail`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Fail)
    }

    /// Whether the lifecycle allows moving from `self` to `to`.
    ///
    /// | From | To |
    /// |------|----|
    /// | ready, pending | running |
    /// | running | pending |
    /// | running, pending | done, fail |
    ///
    /// Every other pair is forbidden; in particular `ready` is never a target and
    /// the terminal states have no outgoing edges.
    #[must_use]
    pub const fn can_transition_to(self, to: RunState) -> bool {
        match to {
            Self::Ready => false,
            Self::Running => matches!(self, Self::Ready | Self::Pending),
            Self::Pending => matches!(self, Self::Running),
            Self::Done | Self::Fail => matches!(self, Self::Running | Self::Pending),
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an effective configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Command-line flag
    Cli,
    /// Configuration file
    Config,
    /// Set through `ConfigBuilder`
    Programmatic,
    /// Built-in default
    Default,
}

impl ConfigSource {
    /// Stable label used in `stepwise config` output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Config => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_allowed_edges() {
        assert!(RunState::Ready.can_transition_to(RunState::Running));
        assert!(RunState::Pending.can_transition_to(RunState::Running));
        assert!(RunState::Running.can_transition_to(RunState::Pending));
        assert!(RunState::Running.can_transition_to(RunState::Done));
        assert!(RunState::Running.can_transition_to(RunState::Fail));
        assert!(RunState::Pending.can_transition_to(RunState::Done));
        assert!(RunState::Pending.can_transition_to(RunState::Fail));
    }

    #[test]
    fn test_transition_table_is_exhaustive() {
        let allowed = [
            (RunState::Ready, RunState::Running),
            (RunState::Pending, RunState::Running),
            (RunState::Running, RunState::Pending),
            (RunState::Running, RunState::Done),
            (RunState::Running, RunState::Fail),
            (RunState::Pending, RunState::Done),
            (RunState::Pending, RunState::Fail),
        ];

        for from in RunState::iter() {
            for to in RunState::iter() {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "unexpected verdict for {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in RunState::iter() {
            assert!(!RunState::Done.can_transition_to(to));
            assert!(!RunState::Fail.can_transition_to(to));
        }
    }

    #[test]
    fn test_run_state_names() {
        assert_eq!(RunState::Ready.to_string(), "ready");
        assert_eq!(RunState::Pending.as_str(), "pending");
        assert_eq!(
            serde_json::to_string(&RunState::Fail).ok().as_deref(),
            Some("\"fail\"")
        );
    }
}
