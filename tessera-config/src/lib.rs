//! Domain-driven configuration management for Tessera
//!
//! Configuration is split by functional domain, with serde defaults on every
//! field, YAML file loading, `TESSERA_*` environment overrides, and a
//! validation pass that runs before the server starts.

pub mod error;
pub mod loader;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{logging::LoggingConfig, server::ServerConfig, TesseraConfig};
