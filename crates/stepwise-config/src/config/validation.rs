use stepwise_utils::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.verbose() && self.quiet() {
            return Err(ConfigError::Conflict {
                first: "verbose".to_string(),
                second: "quiet".to_string(),
            });
        }

        if let Some(shell) = &self.pipeline.shell
            && shell.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "shell".to_string(),
                value: "must not be empty".to_string(),
            });
        }

        if let Some(file) = &self.pipeline.file
            && file.as_os_str().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "pipeline_file".to_string(),
                value: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
