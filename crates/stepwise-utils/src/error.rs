use std::fmt;
use std::io;
use thiserror::Error;

use crate::types::RunState;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `StepwiseError` is the error returned by the stepwise facade. It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Invalid pipeline file |
/// | 4 | A task failed |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use stepwise_utils::error::{StepwiseError, ConfigError};
/// use stepwise_utils::exit_codes::ExitCode;
///
/// let err = StepwiseError::Config(ConfigError::Conflict {
///     first: "verbose".to_string(),
///     second: "quiet".to_string(),
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
/// assert!(err.display_for_user().contains("Suggestions:"));
/// ```
///
/// Library code returns `StepwiseError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum StepwiseError {
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Pipeline,
    TaskExecution,
    Lifecycle,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Pipeline => write!(f, "Pipeline"),
            Self::TaskExecution => write!(f, "Task Execution"),
            Self::Lifecycle => write!(f, "Lifecycle"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

// ============================================================================
// Task errors
// ============================================================================

/// Failure reported by a task through its progress source.
///
/// Tasks build these from plain messages, from `std::io::Error`, or from
/// `anyhow::Error` at glue boundaries.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TaskError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl TaskError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it reachable through `Error::source`.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

impl From<io::Error> for TaskError {
    fn from(err: io::Error) -> Self {
        Self::with_source(err.to_string(), err)
    }
}

impl From<String> for TaskError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for TaskError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

// ============================================================================
// Orchestrator errors
// ============================================================================

/// Errors raised by the task orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Invalid state transition: {from} → {to}")]
    InvalidTransition { from: RunState, to: RunState },

    #[error("Task {position} '{title}' failed: {source}", position = .index + 1)]
    TaskFailed {
        index: usize,
        title: String,
        #[source]
        source: TaskError,
    },

    #[error("Run outcome was resolved more than once")]
    DoubleResolution,

    #[error("No task is active (run is {state})")]
    NoActiveTask { state: RunState },

    #[error("Run finished without resolving its outcome")]
    OutcomeUnresolved,
}

impl OrchestratorError {
    /// Returns the task failure, if this error is one.
    #[must_use]
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            Self::TaskFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl UserFriendlyError for OrchestratorError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidTransition { from, to } => {
                format!("The run cannot move from '{from}' to '{to}'")
            }
            Self::TaskFailed { title, source, .. } => {
                format!("Task '{title}' failed: {source}")
            }
            Self::DoubleResolution => "The run reported its result twice".to_string(),
            Self::NoActiveTask { state } => {
                format!("There is no active task to advance (run is {state})")
            }
            Self::OutcomeUnresolved => "The run ended without a result".to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidTransition { .. } => Some(
                "A run is started once and its terminal state (done or fail) is final".to_string(),
            ),
            Self::TaskFailed { index, .. } => Some(format!(
                "Task {} aborted the run; no later task was started",
                index + 1
            )),
            Self::DoubleResolution | Self::OutcomeUnresolved => {
                Some("This indicates a broken task event lifecycle".to_string())
            }
            Self::NoActiveTask { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidTransition { .. } => vec![
                "Create a new orchestrator for every run".to_string(),
                "Do not call run() again after it has resolved".to_string(),
            ],
            Self::TaskFailed { .. } => vec![
                "Check the task output above for the cause".to_string(),
                "Re-run with --verbose to see every progress line".to_string(),
            ],
            Self::DoubleResolution | Self::OutcomeUnresolved => vec![
                "Report this as a bug with the output of a --verbose run".to_string(),
            ],
            Self::NoActiveTask { .. } => vec![
                "Only call skip() or next() while a task is running".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::TaskFailed { .. } => ErrorCategory::TaskExecution,
            _ => ErrorCategory::Lifecycle,
        }
    }
}

// ============================================================================
// Configuration errors
// ============================================================================

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Conflicting options: {first} and {second}")]
    Conflict { first: String, second: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile { path, reason } => {
                format!("Configuration file '{path}' could not be read: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration value '{value}' is not valid for '{key}'")
            }
            Self::Conflict { first, second } => {
                format!("'{first}' and '{second}' cannot be enabled together")
            }
            Self::NotFound { path } => format!("Configuration file '{path}' does not exist"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile { .. } => {
                Some("Configuration files use TOML with [display] and [pipeline] sections".to_string())
            }
            Self::Conflict { .. } => {
                Some("Values are merged with precedence: CLI > config file > defaults".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile { .. } => vec![
                "Check the file for TOML syntax errors".to_string(),
                "Run 'stepwise config' to see the effective configuration".to_string(),
            ],
            Self::InvalidValue { key, .. } => {
                vec![format!("Provide a valid value for '{key}'")]
            }
            Self::Conflict { first, second } => {
                vec![format!("Remove either '{first}' or '{second}'")]
            }
            Self::NotFound { .. } => vec![
                "Check the path passed to --config".to_string(),
                "Omit --config to search for .stepwise/config.toml".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

// ============================================================================
// Pipeline file errors
// ============================================================================

/// Errors loading or validating a pipeline file
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline file not found at {path}")]
    NotFound { path: String },

    #[error("Failed to parse pipeline file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Pipeline file {path} defines no tasks")]
    Empty { path: String },

    #[error("Task {position} is invalid: {reason}", position = .index + 1)]
    InvalidTask { index: usize, reason: String },

    #[error("Context key '{key}' is captured by more than one task")]
    DuplicateCapture { key: String },
}

impl UserFriendlyError for PipelineError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => format!("Pipeline file '{path}' does not exist"),
            Self::Parse { path, reason } => {
                format!("Pipeline file '{path}' could not be parsed: {reason}")
            }
            Self::Empty { path } => format!("Pipeline file '{path}' has no [[tasks]] entries"),
            Self::InvalidTask { index, reason } => {
                format!("Task {} in the pipeline is invalid: {reason}", index + 1)
            }
            Self::DuplicateCapture { key } => {
                format!("More than one task captures into context key '{key}'")
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some("Each [[tasks]] entry needs a title and a command".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec![
                "Pass the pipeline path explicitly: stepwise run <PIPELINE>".to_string(),
                "Or set [pipeline] file in .stepwise/config.toml".to_string(),
            ],
            Self::DuplicateCapture { .. } => {
                vec!["Give every 'capture' a distinct key".to_string()]
            }
            _ => vec!["Run 'stepwise check <PIPELINE>' to validate the file".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Pipeline
    }
}

impl UserFriendlyError for StepwiseError {
    fn user_message(&self) -> String {
        match self {
            Self::Orchestrator(err) => err.user_message(),
            Self::Config(err) => err.user_message(),
            Self::Pipeline(err) => err.user_message(),
            Self::Io(err) => format!("File system operation failed: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Orchestrator(err) => err.context(),
            Self::Config(err) => err.context(),
            Self::Pipeline(err) => err.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Orchestrator(err) => err.suggestions(),
            Self::Config(err) => err.suggestions(),
            Self::Pipeline(err) => err.suggestions(),
            Self::Io(_) => vec!["Check file permissions and available disk space".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Orchestrator(err) => err.category(),
            Self::Config(err) => err.category(),
            Self::Pipeline(err) => err.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl StepwiseError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// | Exit Code | Name | Description |
    /// |-----------|------|-------------|
    /// | 1 | INTERNAL | General failure |
    /// | 2 | CLI_ARGS | Invalid CLI arguments or configuration |
    /// | 3 | PIPELINE_INVALID | Pipeline file missing or malformed |
    /// | 4 | TASK_FAILED | A task reported failure |
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Pipeline(_) => ExitCode::PIPELINE_INVALID,
            Self::Orchestrator(OrchestratorError::TaskFailed { .. }) => ExitCode::TASK_FAILED,
            _ => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::ExitCode;
    use std::error::Error as _;

    fn task_failed() -> OrchestratorError {
        OrchestratorError::TaskFailed {
            index: 2,
            title: "Upload".to_string(),
            source: TaskError::new("receiver unreachable"),
        }
    }

    #[test]
    fn test_invalid_transition_message_carries_pair() {
        let err = OrchestratorError::InvalidTransition {
            from: RunState::Done,
            to: RunState::Running,
        };
        assert_eq!(err.to_string(), "Invalid state transition: done → running");
        assert_eq!(err.category(), ErrorCategory::Lifecycle);
    }

    #[test]
    fn test_task_failed_uses_one_based_position() {
        let err = task_failed();
        assert_eq!(
            err.to_string(),
            "Task 3 'Upload' failed: receiver unreachable"
        );
        assert_eq!(
            err.task_error().map(TaskError::message),
            Some("receiver unreachable")
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_task_error_conversions() {
        let from_anyhow: TaskError = anyhow::anyhow!("inner").context("outer").into();
        assert_eq!(from_anyhow.message(), "outer: inner");

        let from_io: TaskError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert_eq!(from_io.message(), "missing");
        assert!(from_io.source().is_some());

        let from_str: TaskError = "plain".into();
        assert!(from_str.source().is_none());
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            StepwiseError::from(task_failed()).to_exit_code(),
            ExitCode::TASK_FAILED
        );
        assert_eq!(
            StepwiseError::from(OrchestratorError::DoubleResolution).to_exit_code(),
            ExitCode::INTERNAL
        );
        assert_eq!(
            StepwiseError::from(PipelineError::Empty {
                path: "p.toml".to_string()
            })
            .to_exit_code(),
            ExitCode::PIPELINE_INVALID
        );
        assert_eq!(
            StepwiseError::from(ConfigError::NotFound {
                path: "c.toml".to_string()
            })
            .to_exit_code(),
            ExitCode::CLI_ARGS
        );
    }

    #[test]
    fn test_display_for_user_sections() {
        let err = StepwiseError::from(task_failed());
        let message = err.display_for_user();

        assert!(message.starts_with("Error: Task 'Upload' failed: receiver unreachable"));
        assert!(message.contains("Context: Task 3 aborted the run"));
        assert!(message.contains("  • Check the task output above"));
    }
}
