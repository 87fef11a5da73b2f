use std::path::PathBuf;

/// Configuration values given on the command line.
///
/// `None` means the flag was not passed and lower-precedence sources apply.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit configuration file (`--config`); disables discovery
    pub config_path: Option<PathBuf>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
    pub color: Option<bool>,
    pub shell: Option<String>,
    pub pipeline_file: Option<PathBuf>,
}
