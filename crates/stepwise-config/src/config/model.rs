use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use stepwise_utils::types::ConfigSource;

/// Shell used for pipeline commands when none is configured
pub const DEFAULT_SHELL: &str = "sh";

/// Pipeline file looked up in the working directory by default
pub const DEFAULT_PIPELINE_FILE: &str = "stepwise.toml";

/// Directory holding the project configuration file
pub const CONFIG_DIR: &str = ".stepwise";

/// Name of the configuration file inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// `[display]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Echo every progress line and enable debug logging
    pub verbose: Option<bool>,
    /// Suppress task announcements and the spinner
    pub quiet: Option<bool>,
    /// Allow ANSI colours (default: true)
    pub color: Option<bool>,
}

/// `[pipeline]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Shell invoked as `<shell> -c <command>`
    pub shell: Option<String>,
    /// Default pipeline file
    pub file: Option<PathBuf>,
}

/// Effective configuration after applying every source.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub display: DisplayConfig,
    pub pipeline: PipelineConfig,
    /// Source of each key that was set by something other than a default
    pub source_attribution: HashMap<String, ConfigSource>,
    pub(crate) config_path: Option<PathBuf>,
}
