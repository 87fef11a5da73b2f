use std::io::{IsTerminal, Write};
use std::time::Duration;

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

use super::{ProgressDisplay, TaskAnnouncement};

const DEFAULT_ACTIVITY: &str = "processing...";
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ";

/// Human-facing display: one line per task plus a spinner for the active task.
///
/// Everything is written to stderr so stdout stays free for machine output.
#[derive(Debug)]
pub struct TerminalDisplay {
    spinner: Option<ProgressBar>,
    verbose: bool,
    color: bool,
}

impl TerminalDisplay {
    /// `color` is a request; it is ignored when stderr is not a terminal or
    /// `NO_COLOR` is set.
    #[must_use]
    pub fn new(verbose: bool, color: bool) -> Self {
        Self {
            spinner: None,
            verbose,
            color: color && use_color(),
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn start_spinner(&mut self) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS);
        spinner.set_style(style);
        spinner.set_message(DEFAULT_ACTIVITY);
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print_line(&self, line: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| eprintln!("{line}")),
            None => {
                let mut stderr = std::io::stderr().lock();
                let _ = writeln!(stderr, "{line}");
            }
        }
    }
}

impl ProgressDisplay for TerminalDisplay {
    fn announce_task(&mut self, announcement: &TaskAnnouncement<'_>) {
        self.stop_spinner();

        let label = announcement.position_label();
        let mut line = format!("{} {}", self.dim(&label), announcement.title);
        if announcement.skipped() {
            line.push(' ');
            line.push_str(&self.dim("[skipped]"));
        }
        self.print_line(&line);

        if let Some(reason) = announcement.skip_reason {
            let indent = " ".repeat(label.len());
            self.print_line(&format!("{indent} {}", self.dim(&format!("→ {reason}"))));
        }

        self.start_spinner();
    }

    fn update_progress(&mut self, text: &str) {
        if self.verbose {
            self.print_line(&format!("  {}", self.dim(text)));
        }
        match &self.spinner {
            Some(spinner) => spinner.set_message(text.to_string()),
            // Progress after a quiet request brings the spinner back.
            None => {
                self.start_spinner();
                if let Some(spinner) = &self.spinner {
                    spinner.set_message(text.to_string());
                }
            }
        }
    }

    fn clear(&mut self) {
        self.stop_spinner();
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

/// Colour only on an interactive stderr without `NO_COLOR`.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
