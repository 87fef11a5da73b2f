mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;
pub use sources::EffectiveValue;
pub use stepwise_utils::types::ConfigSource;

use std::path::{Path, PathBuf};

impl Config {
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.display.verbose.unwrap_or(false)
    }

    #[must_use]
    pub fn quiet(&self) -> bool {
        self.display.quiet.unwrap_or(false)
    }

    /// Whether ANSI styling may be used. Terminal detection happens at render time.
    #[must_use]
    pub fn color(&self) -> bool {
        self.display.color.unwrap_or(true)
    }

    /// Shell used to run pipeline commands.
    #[must_use]
    pub fn shell(&self) -> &str {
        self.pipeline.shell.as_deref().unwrap_or(DEFAULT_SHELL)
    }

    /// Pipeline file to run when none is given on the command line.
    #[must_use]
    pub fn pipeline_file(&self) -> PathBuf {
        self.pipeline
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PIPELINE_FILE))
    }

    /// The configuration file that was loaded, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Where the effective value of `key` came from.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(!config.verbose());
        assert!(!config.quiet());
        assert!(config.color());
        assert_eq!(config.shell(), "sh");
        assert_eq!(config.pipeline_file(), PathBuf::from("stepwise.toml"));
        assert_eq!(config.source_of("shell"), ConfigSource::Default);
        assert!(config.config_path().is_none());
    }
}
