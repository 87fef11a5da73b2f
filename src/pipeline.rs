//! Pipeline files: TOML lists of shell commands run as tasks.
//!
//! ```toml
//! [[tasks]]
//! title = "Build"
//! command = "make build"
//! capture = "build_output"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use stepwise_engine::Task;
use stepwise_utils::error::PipelineError;

use crate::command::{CommandSpec, command_task};

/// One `[[tasks]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub title: String,
    pub command: String,
    /// Context key that receives the last non-empty stdout line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
    /// When set, the task skips itself with this reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<String>,
    /// Working directory, relative to the pipeline file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelineDocument {
    #[serde(default)]
    tasks: Vec<TaskSpec>,
}

/// A parsed and validated pipeline file.
#[derive(Debug, Clone)]
pub struct PipelineFile {
    path: PathBuf,
    base_dir: PathBuf,
    tasks: Vec<TaskSpec>,
}

impl PipelineFile {
    /// Read, parse and validate the pipeline at `path`.
    ///
    /// # Errors
    /// Returns a [`PipelineError`] when the file is missing, is not valid TOML,
    /// or describes an invalid task list.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                PipelineError::Parse {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        Self::parse(path, &content)
    }

    /// Parse pipeline text; `path` names the file in errors and anchors
    /// relative working directories.
    ///
    /// # Errors
    /// Same as [`load`](Self::load), minus the read step.
    pub fn parse(path: &Path, content: &str) -> Result<Self, PipelineError> {
        let document: PipelineDocument =
            toml::from_str(content).map_err(|e| PipelineError::Parse {
                path: path.display().to_string(),
                reason: e.message().to_string(),
            })?;

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let pipeline = Self {
            path: path.to_path_buf(),
            base_dir,
            tasks: document.tasks,
        };
        pipeline.validate()?;
        debug!(path = %path.display(), tasks = pipeline.tasks.len(), "Pipeline loaded");
        Ok(pipeline)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.tasks.is_empty() {
            return Err(PipelineError::Empty {
                path: self.path.display().to_string(),
            });
        }

        let mut captures = HashSet::new();
        for (index, task) in self.tasks.iter().enumerate() {
            let invalid = |reason: &str| PipelineError::InvalidTask {
                index,
                reason: reason.to_string(),
            };

            if task.title.trim().is_empty() {
                return Err(invalid("title must not be empty"));
            }
            if task.command.trim().is_empty() {
                return Err(invalid("command must not be empty"));
            }
            if let Some(key) = &task.capture {
                if !is_valid_key(key) {
                    return Err(invalid(
                        "capture key must be non-empty and use only letters, digits, '_' or '-'",
                    ));
                }
                if !captures.insert(key.as_str()) {
                    return Err(PipelineError::DuplicateCapture { key: key.clone() });
                }
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Turn every entry into a task that runs its command through `shell`.
    #[must_use]
    pub fn into_tasks(self, shell: &str) -> Vec<Task> {
        let base_dir = self.base_dir;
        self.tasks
            .into_iter()
            .map(|spec| {
                let cwd = match &spec.cwd {
                    Some(dir) => base_dir.join(dir),
                    None => base_dir.clone(),
                };
                command_task(
                    spec.title,
                    CommandSpec {
                        shell: shell.to_string(),
                        command: spec.command,
                        cwd,
                        capture: spec.capture,
                    },
                    spec.skip,
                )
            })
            .collect()
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
