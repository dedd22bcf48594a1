//! Configuration loading: YAML files plus environment overrides

use std::path::Path;

use crate::{
    domains::TesseraConfig,
    error::{ConfigError, ConfigResult},
};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "TESSERA_";

/// Loads configuration from defaults, an optional YAML file, and the
/// environment, in that precedence order (later wins)
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load from an optional file path, then apply environment overrides
    pub fn load(&self, path: Option<&Path>) -> ConfigResult<TesseraConfig> {
        let mut config = match path {
            Some(path) => self.load_file(path)?,
            None => TesseraConfig::default(),
        };
        self.apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn load_file(&self, path: &Path) -> ConfigResult<TesseraConfig> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// `TESSERA_BIND_ADDRESS`, `TESSERA_PORT`, `TESSERA_API_PREFIX`,
    /// `TESSERA_LOG_LEVEL` override the corresponding fields
    fn apply_env_overrides(&self, config: &mut TesseraConfig) {
        if let Ok(value) = std::env::var(format!("{ENV_PREFIX}BIND_ADDRESS")) {
            config.server.bind_address = value;
        }
        if let Some(port) = std::env::var(format!("{ENV_PREFIX}PORT"))
            .ok()
            .and_then(|value| value.parse().ok())
        {
            config.server.port = port;
        }
        if let Ok(value) = std::env::var(format!("{ENV_PREFIX}API_PREFIX")) {
            config.server.api_prefix = value;
        }
        if let Ok(value) = std::env::var(format!("{ENV_PREFIX}LOG_LEVEL")) {
            config.logging.level = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_no_file() {
        let config = ConfigLoader::new().load(None).unwrap();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9000\nlogging:\n  level: debug\n"
        )
        .unwrap();

        let config = ConfigLoader::new().load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        // Unset fields keep their defaults
        assert_eq!(config.server.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_invalid_yaml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map]").unwrap();
        let err = ConfigLoader::new().load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
