use std::collections::BTreeMap;

use serde::Serialize;

use super::{Config, ConfigSource};

/// One effective configuration value and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveValue {
    pub value: String,
    pub source: ConfigSource,
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution,
    /// ordered by key.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, EffectiveValue> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: String| {
            config.insert(
                key.to_string(),
                EffectiveValue {
                    value,
                    source: self.source_of(key),
                },
            );
        };

        add("verbose", self.verbose().to_string());
        add("quiet", self.quiet().to_string());
        add("color", self.color().to_string());
        add("shell", self.shell().to_string());
        add("pipeline_file", self.pipeline_file().display().to_string());

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigBuilder;

    #[test]
    fn test_effective_config_lists_every_key() {
        let config = ConfigBuilder::new().shell("bash").build().unwrap();
        let effective = config.effective_config();

        let keys: Vec<&str> = effective.keys().map(String::as_str).collect();
        assert_eq!(keys, ["color", "pipeline_file", "quiet", "shell", "verbose"]);
        assert_eq!(
            effective["shell"],
            EffectiveValue {
                value: "bash".to_string(),
                source: ConfigSource::Programmatic,
            }
        );
        assert_eq!(effective["verbose"].source, ConfigSource::Default);
    }
}
