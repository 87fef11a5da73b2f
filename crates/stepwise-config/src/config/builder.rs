use std::collections::HashMap;
use std::path::PathBuf;

use stepwise_utils::error::ConfigError;

use super::{Config, ConfigSource, DisplayConfig, PipelineConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stepwise_config::Config;
    ///
    /// let config = Config::builder()
    ///     .shell("bash")
    ///     .quiet(true)
    ///     .build()
    ///     .expect("valid configuration");
    /// assert_eq!(config.shell(), "bash");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for configuring stepwise without files or command-line flags.
///
/// All values set through the builder are attributed to
/// [`ConfigSource::Programmatic`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    verbose: Option<bool>,
    quiet: Option<bool>,
    color: Option<bool>,
    shell: Option<String>,
    pipeline_file: Option<PathBuf>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = Some(quiet);
        self
    }

    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    #[must_use]
    pub fn pipeline_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pipeline_file = Some(path.into());
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the values fail validation, for example
    /// `verbose` together with `quiet`.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut source_attribution = HashMap::new();
        let mut mark = |key: &str, set: bool| {
            if set {
                source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
            }
        };
        mark("verbose", self.verbose.is_some());
        mark("quiet", self.quiet.is_some());
        mark("color", self.color.is_some());
        mark("shell", self.shell.is_some());
        mark("pipeline_file", self.pipeline_file.is_some());

        let config = Config {
            display: DisplayConfig {
                verbose: self.verbose,
                quiet: self.quiet,
                color: self.color,
            },
            pipeline: PipelineConfig {
                shell: self.shell,
                file: self.pipeline_file,
            },
            source_attribution,
            config_path: None,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_attributes_programmatic_source() {
        let config = ConfigBuilder::new()
            .verbose(true)
            .pipeline_file("jobs.toml")
            .build()
            .unwrap();

        assert!(config.verbose());
        assert_eq!(config.pipeline_file(), PathBuf::from("jobs.toml"));
        assert_eq!(config.source_of("verbose"), ConfigSource::Programmatic);
        assert_eq!(config.source_of("quiet"), ConfigSource::Default);
    }

    #[test]
    fn test_builder_validates() {
        let err = ConfigBuilder::new().verbose(true).quiet(true).build();
        assert!(matches!(err, Err(ConfigError::Conflict { .. })));
    }
}
