//! Logging configuration

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (`trace` through `error`)
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::validation(format!(
                "logging.level {other:?} is not one of trace/debug/info/warn/error"
            ))),
        }
    }

    /// Env-filter directive for tracing-subscriber
    pub fn env_filter(&self) -> String {
        self.level.clone()
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_validation() {
        assert!(LoggingConfig::default().validate().is_ok());
        let bad = LoggingConfig {
            level: "loud".to_string(),
            format: LogFormat::Text,
        };
        assert!(bad.validate().is_err());
    }
}
