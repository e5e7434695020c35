//! Abstract interfaces for warung components.
//!
//! These traits define the contracts for:
//! - Per-service storage (each service exclusively owns its rows)
//! - Cross-service gateways (how the orchestrator reaches the other
//!   services; implemented over the resilient clients, mocked in tests)

pub mod gateway;
pub mod kitchen;
pub mod loyalty;
pub mod order;
pub mod stock;

pub use gateway::{GatewayError, InventoryGateway, KitchenGateway, LoyaltyGateway, SupplierGateway};
pub use kitchen::{ChefRecord, ChefStatus, KitchenStore, TicketRecord, TicketStatus};
pub use loyalty::{AccountRecord, LoyaltyStore, Tier, TransactionKind, TransactionRecord};
pub use order::{MenuStore, OrderRecord, OrderStatus, OrderStore, PaymentStatus};
pub use stock::{IngredientRecord, IngredientStatus, MovementDirection, MovementRecord, StockStore};

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("malformed stored value: {0}")]
    Corrupt(String),

    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
