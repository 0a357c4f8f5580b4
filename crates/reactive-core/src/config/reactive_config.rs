//! Top-level configuration

use serde::{Deserialize, Serialize};

use super::logging_config::LoggingConfig;
use crate::error::{ReactiveError, ReactiveResult};

/// Whether a class sees the commands marked on its ancestors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandInheritance {
    /// Effective commands are the class's own marks plus every ancestor's
    #[default]
    Inherited,
    /// Only the marks made on the class itself count
    OwnOnly,
}

/// Configuration for class building and logging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveConfig {
    pub command_inheritance: CommandInheritance,
    pub logging: LoggingConfig,
}

impl ReactiveConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> ReactiveResult<Self> {
        toml::from_str(content)
            .map_err(|e| ReactiveError::config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> ReactiveResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| ReactiveError::config(format!("Failed to parse JSON config: {}", e)))
    }

    /// Merge with another config.
    ///
    /// Fields the other config leaves at their default are ignored, so a
    /// partial override only changes what it sets.
    pub fn merge(&mut self, other: ReactiveConfig) {
        if other.command_inheritance != CommandInheritance::default() {
            self.command_inheritance = other.command_inheritance;
        }
        self.logging.merge(other.logging);
    }

    /// Set the command inheritance policy
    pub fn with_command_inheritance(mut self, policy: CommandInheritance) -> Self {
        self.command_inheritance = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;

    #[test]
    fn test_default_is_inheritance_aware() {
        let config = ReactiveConfig::default();
        assert_eq!(config.command_inheritance, CommandInheritance::Inherited);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_toml_str() {
        let config = ReactiveConfig::from_toml_str(
            r#"
command_inheritance = "own_only"

[logging]
level = "debug"
format = "compact"
"#,
        )
        .unwrap();

        assert_eq!(config.command_inheritance, CommandInheritance::OwnOnly);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = ReactiveConfig::from_toml_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.command_inheritance, CommandInheritance::Inherited);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_from_json_str() {
        let config =
            ReactiveConfig::from_json_str(r#"{"command_inheritance": "own_only"}"#).unwrap();
        assert_eq!(config.command_inheritance, CommandInheritance::OwnOnly);
    }

    #[test]
    fn test_invalid_config() {
        let err = ReactiveConfig::from_toml_str("command_inheritance = \"sometimes\"").unwrap_err();
        assert_eq!(err.error_code(), "REACTIVE_CONFIG");
    }

    #[test]
    fn test_merge() {
        let mut config = ReactiveConfig::default();
        config.merge(ReactiveConfig::default().with_command_inheritance(CommandInheritance::OwnOnly));
        assert_eq!(config.command_inheritance, CommandInheritance::OwnOnly);
    }

    #[test]
    fn test_merge_partial_keeps_policy() {
        let mut config = ReactiveConfig::default().with_command_inheritance(CommandInheritance::OwnOnly);
        config.logging.format = LogFormat::Json;

        let partial = ReactiveConfig::from_toml_str("[logging]\nlevel = \"trace\"\n").unwrap();
        config.merge(partial);

        assert_eq!(config.command_inheritance, CommandInheritance::OwnOnly);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
