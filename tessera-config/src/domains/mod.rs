//! Domain-specific configuration modules

pub mod logging;
pub mod server;

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;

/// Root Tessera configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TesseraConfig {
    /// Server configuration
    pub server: server::ServerConfig,

    /// Logging configuration
    pub logging: logging::LoggingConfig,
}

impl TesseraConfig {
    /// Validate every domain
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
