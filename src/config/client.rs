//! Downstream endpoint and call configuration types.

use std::time::Duration;

use serde::Deserialize;
use warung_client::RetryPolicy;

/// Service endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoint {
    /// gRPC address (host:port).
    pub address: String,
}

/// Endpoints of the services a binary may call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Kitchen service (called by the order service).
    pub kitchen: ServiceEndpoint,
    /// Inventory service (called by the order service).
    pub inventory: ServiceEndpoint,
    /// Loyalty service (called by the order service).
    pub loyalty: ServiceEndpoint,
    /// Third-party supplier (called by the inventory service).
    /// None disables the supplier integration.
    pub supplier: Option<ServiceEndpoint>,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            kitchen: ServiceEndpoint {
                address: "localhost:50052".to_string(),
            },
            inventory: ServiceEndpoint {
                address: "localhost:50053".to_string(),
            },
            loyalty: ServiceEndpoint {
                address: "localhost:50054".to_string(),
            },
            supplier: None,
        }
    }
}

/// Remote call retry/timeout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Total number of attempts per call.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Cap on the backoff delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Per-attempt timeout, in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            attempt_timeout_ms: 10_000,
        }
    }
}

impl CallConfig {
    /// Build the retry policy used by the typed clients.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_config_policy() {
        let config = CallConfig::default();
        let policy = config.policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.attempt_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_downstream_defaults() {
        let config = DownstreamConfig::default();
        assert_eq!(config.kitchen.address, "localhost:50052");
        assert!(config.supplier.is_none());
    }
}
