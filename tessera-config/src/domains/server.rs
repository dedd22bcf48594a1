//! Server configuration for the REST API

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// API path prefix
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            api_prefix: default_api_prefix(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::validation("server.bind_address must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::validation("server.port must be non-zero"));
        }
        if !self.api_prefix.starts_with('/') {
            return Err(ConfigError::validation("server.api_prefix must start with '/'"));
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_listen_address() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_address(), "127.0.0.1:8090");
    }
}
