//! Server and storage configuration types.

use serde::Deserialize;

/// Server configuration.
///
/// Each service binary picks its own port; the defaults keep all four
/// services co-runnable on one host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port for the order gRPC service.
    pub order_port: u16,
    /// Port for the kitchen gRPC service.
    pub kitchen_port: u16,
    /// Port for the inventory gRPC service.
    pub inventory_port: u16,
    /// Port for the loyalty gRPC service.
    pub loyalty_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            order_port: 50051,
            kitchen_port: 50052,
            inventory_port: 50053,
            loyalty_port: 50054,
        }
    }
}

impl ServerConfig {
    /// Socket address string for the given port.
    pub fn addr(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend: "memory" or "sqlite".
    #[serde(rename = "type")]
    pub storage_type: String,
    /// Database file path (sqlite only).
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: "memory".to_string(),
            path: "data/warung.db".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(config.order_port), "0.0.0.0:50051");
        assert_eq!(config.addr(config.loyalty_port), "0.0.0.0:50054");
    }
}
