//! Application configuration.
//!
//! Aggregates configuration for all services into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod business;
mod client;
mod server;

pub use business::{LoyaltyPolicy, PricingPolicy};
pub use client::{CallConfig, DownstreamConfig, ServiceEndpoint};
pub use server::{ServerConfig, StorageConfig};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "WARUNG_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "WARUNG";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "WARUNG_LOG";

use serde::Deserialize;

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Downstream service endpoints.
    pub downstream: DownstreamConfig,
    /// Remote call retry/timeout configuration.
    pub call: CallConfig,
    /// Pricing policy constants.
    pub pricing: PricingPolicy,
    /// Loyalty tier policy.
    pub loyalty: LoyaltyPolicy,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `WARUNG_CONFIG` environment variable (if set)
    /// 4. Environment variables with `WARUNG` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.storage_type, "memory");
        assert_eq!(config.call.max_retries, 3);
    }

    #[test]
    fn test_config_for_test() {
        let config = Config::for_test();
        assert_eq!(config.pricing.tax_rate, 0.10);
    }
}
