use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use stepwise_utils::error::ConfigError;

use super::{
    CONFIG_DIR, CONFIG_FILE, CliArgs, Config, ConfigSource, DisplayConfig, PipelineConfig,
};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    display: Option<DisplayConfig>,
    pipeline: Option<PipelineConfig>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the file cannot be read or parsed, or the
    /// merged values fail validation.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir().map_err(|e| ConfigError::InvalidFile {
            path: ".".to_string(),
            reason: format!("cannot determine the working directory: {e}"),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// Path-driven variant of [`discover`](Self::discover), used by tests to
    /// avoid process-global state.
    ///
    /// # Errors
    /// Same as [`discover`](Self::discover).
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut source_attribution = HashMap::new();
        let mut display = DisplayConfig::default();
        let mut pipeline = PipelineConfig::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            debug!(path = %path.display(), "Loading configuration file");
            let file_config = Self::load_config_file(path)?;
            let source = ConfigSource::Config;

            if let Some(file_display) = file_config.display {
                if file_display.verbose.is_some() {
                    display.verbose = file_display.verbose;
                    source_attribution.insert("verbose".to_string(), source);
                }
                if file_display.quiet.is_some() {
                    display.quiet = file_display.quiet;
                    source_attribution.insert("quiet".to_string(), source);
                }
                if file_display.color.is_some() {
                    display.color = file_display.color;
                    source_attribution.insert("color".to_string(), source);
                }
            }

            if let Some(file_pipeline) = file_config.pipeline {
                if file_pipeline.shell.is_some() {
                    pipeline.shell = file_pipeline.shell;
                    source_attribution.insert("shell".to_string(), source);
                }
                if let Some(file) = file_pipeline.file {
                    pipeline.file = Some(resolve_relative(path, file));
                    source_attribution.insert("pipeline_file".to_string(), source);
                }
            }
        }

        // CLI overrides everything
        let cli = ConfigSource::Cli;
        if cli_args.verbose.is_some() {
            display.verbose = cli_args.verbose;
            source_attribution.insert("verbose".to_string(), cli);
        }
        if cli_args.quiet.is_some() {
            display.quiet = cli_args.quiet;
            source_attribution.insert("quiet".to_string(), cli);
        }
        if cli_args.color.is_some() {
            display.color = cli_args.color;
            source_attribution.insert("color".to_string(), cli);
        }
        if cli_args.shell.is_some() {
            pipeline.shell.clone_from(&cli_args.shell);
            source_attribution.insert("shell".to_string(), cli);
        }
        if cli_args.pipeline_file.is_some() {
            pipeline.file.clone_from(&cli_args.pipeline_file);
            source_attribution.insert("pipeline_file".to_string(), cli);
        }

        let config = Self {
            display,
            pipeline,
            source_attribution,
            config_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Search upward from `start_dir` for `.stepwise/config.toml`.
    ///
    /// The search stops at the first repository root (`.git`, `.hg`, `.svn`).
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current = Some(start_dir);

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if [".git", ".hg", ".svn"]
                .iter()
                .any(|marker| dir.join(marker).exists())
            {
                break;
            }
            current = dir.parent();
        }

        None
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::InvalidFile {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })
    }
}

/// Relative paths in a config file are anchored at the project root: the
/// directory holding `.stepwise/`, or the file's own directory otherwise.
fn resolve_relative(config_path: &Path, file: PathBuf) -> PathBuf {
    if file.is_absolute() {
        return file;
    }

    let parent = config_path.parent().unwrap_or_else(|| Path::new("."));
    let base = if parent.file_name().is_some_and(|name| name == CONFIG_DIR) {
        parent.parent().unwrap_or(parent)
    } else {
        parent
    };
    base.join(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(root: &Path, content: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discovers_config_in_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[pipeline]\nshell = \"bash\"\n");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_config_file_from(&nested), Some(path.clone()));

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();
        assert_eq!(config.shell(), "bash");
        assert_eq!(config.source_of("shell"), ConfigSource::Config);
        assert_eq!(config.config_path(), Some(path.as_path()));
    }

    #[test]
    fn test_search_stops_at_repository_root() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[display]\nverbose = true\n");
        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert_eq!(Config::discover_config_file_from(&repo), None);
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "[display]\nverbose = true\ncolor = false\n\n[pipeline]\nshell = \"bash\"\n",
        );
        let cli = CliArgs {
            shell: Some("zsh".to_string()),
            ..CliArgs::default()
        };

        let config = Config::discover_from(temp.path(), &cli).unwrap();

        assert_eq!(config.shell(), "zsh");
        assert_eq!(config.source_of("shell"), ConfigSource::Cli);
        assert!(config.verbose());
        assert!(!config.color());
        assert_eq!(config.source_of("color"), ConfigSource::Config);
    }

    #[test]
    fn test_pipeline_file_is_relative_to_project_root() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[pipeline]\nfile = \"ci/pipeline.toml\"\n");

        let config = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();

        assert_eq!(
            config.pipeline_file(),
            temp.path().join("ci").join("pipeline.toml")
        );
    }

    #[test]
    fn test_explicit_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let cli = CliArgs {
            config_path: Some(temp.path().join("missing.toml")),
            ..CliArgs::default()
        };

        let err = Config::discover_from(temp.path(), &cli).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[display]\nverbosity = 3\n");

        let err = Config::discover_from(temp.path(), &CliArgs::default()).unwrap_err();
        match err {
            ConfigError::InvalidFile { reason, .. } => assert!(reason.contains("verbosity")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
