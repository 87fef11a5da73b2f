//! Shell command tasks.
//!
//! Each command runs as `<shell> -c <command>`. Non-empty stdout lines become
//! progress, context entries are exported as `STEPWISE_<KEY>` variables, and a
//! non-zero exit fails the task with the tail of stderr.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use stepwise_engine::{ProgressHandle, ProgressSource, SharedContext, Task};
use stepwise_utils::error::TaskError;

/// Lines of stderr kept for failure messages
pub const STDERR_TAIL_LINES: usize = 10;

/// Prefix for context entries exported to commands
pub const ENV_PREFIX: &str = "STEPWISE_";

/// How to run one command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub shell: String,
    pub command: String,
    pub cwd: PathBuf,
    /// Context key for the last non-empty stdout line
    pub capture: Option<String>,
}

/// Task running `spec`, or skipping itself with `skip` as the reason.
pub fn command_task(title: impl Into<String>, spec: CommandSpec, skip: Option<String>) -> Task {
    Task::new(title, move |context, controller| {
        if let Some(reason) = &skip {
            // The skip request is read before the source's terminal event.
            return match controller.skip(reason.clone()) {
                Ok(()) => ProgressSource::completed(),
                Err(err) => ProgressSource::failed(err.to_string()),
            };
        }

        let spec = spec.clone();
        ProgressSource::spawn(move |progress| run_command(spec, context, progress))
    })
}

async fn run_command(
    spec: CommandSpec,
    context: SharedContext,
    progress: ProgressHandle,
) -> Result<(), TaskError> {
    let mut command = Command::new(&spec.shell);
    command
        .arg("-c")
        .arg(&spec.command)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in context.snapshot() {
        command.env(env_var_name(&key), env_value(&value));
    }

    debug!(shell = %spec.shell, command = %spec.command, cwd = %spec.cwd.display(), "Spawning command");
    let mut child = command
        .spawn()
        .map_err(|e| TaskError::with_source(format!("failed to start '{}'", spec.shell), e))?;

    let stderr = child.stderr.take();
    let stderr_tail = tokio::spawn(async move {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        if let Some(stderr) = stderr {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            while let Ok(Some(line)) = next_line_lossy(&mut reader, &mut buf).await {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }
        tail
    });

    let mut last_line = None;
    if let Some(stdout) = child.stdout.take() {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while let Some(line) = next_line_lossy(&mut reader, &mut buf)
            .await
            .map_err(|e| TaskError::with_source("failed to read command output", e))?
        {
            let line = line.trim_end();
            if !line.is_empty() {
                progress.progress(line);
                last_line = Some(line.to_string());
            }
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| TaskError::with_source("failed to wait for command", e))?;
    let tail = stderr_tail.await.unwrap_or_default();

    if !status.success() {
        return Err(TaskError::new(failure_message(status, &tail)));
    }

    if let Some(key) = &spec.capture {
        context.insert(key.clone(), last_line.unwrap_or_default());
    }
    Ok(())
}

/// Next line without its terminator, invalid UTF-8 replaced. `None` at EOF.
async fn next_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn failure_message(status: ExitStatus, stderr_tail: &VecDeque<String>) -> String {
    let mut message = match status.code() {
        Some(code) => format!("command exited with code {code}"),
        None => "command was terminated by a signal".to_string(),
    };
    if !stderr_tail.is_empty() {
        message.push_str(":\n");
        message.push_str(&Vec::from(stderr_tail.clone()).join("\n"));
    }
    message
}

/// `build-output` becomes `STEPWISE_BUILD_OUTPUT`.
#[must_use]
pub fn env_var_name(key: &str) -> String {
    let normalized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{ENV_PREFIX}{normalized}")
}

/// Strings are exported as-is, everything else as JSON.
fn env_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
