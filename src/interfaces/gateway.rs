//! Cross-service gateway interfaces.
//!
//! The orchestrator and handlers talk to the other services through these
//! traits. Production implementations wrap the resilient clients from
//! `warung-client`; tests substitute programmable fakes.

use async_trait::async_trait;

use super::order::OrderLineItem;
use super::stock::Reference;

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur when calling another service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The remote call exhausted its retries without being delivered.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The remote service handled the call and rejected it.
    #[error("rejected by upstream: {0}")]
    Rejected(String),
}

impl From<tonic::Status> for GatewayError {
    fn from(status: tonic::Status) -> Self {
        use tonic::Code;
        match status.code() {
            Code::Unavailable
            | Code::DeadlineExceeded
            | Code::Cancelled
            | Code::Unknown
            | Code::Internal => GatewayError::Unavailable(status.message().to_string()),
            _ => GatewayError::Rejected(status.message().to_string()),
        }
    }
}

/// Result of a remote stock availability check.
#[derive(Debug, Clone)]
pub struct StockProbe {
    pub available: bool,
    pub current_stock: f64,
    pub message: String,
}

/// Kitchen service as seen by the order service.
#[async_trait]
pub trait KitchenGateway: Send + Sync {
    /// Open a production ticket for an order.
    async fn open_ticket(
        &self,
        order_id: &str,
        table_number: Option<&str>,
        items: &[OrderLineItem],
    ) -> GatewayResult<()>;

    /// Complete the ticket belonging to an order, if any.
    async fn complete_for_order(&self, order_id: &str) -> GatewayResult<()>;
}

/// Inventory service as seen by the order service.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Debit stock for one ingredient.
    async fn reduce_stock(
        &self,
        ingredient_id: &str,
        quantity: f64,
        reason: &str,
        reference: Reference,
    ) -> GatewayResult<()>;

    /// Availability check for one ingredient.
    async fn check_stock(&self, ingredient_id: &str, quantity: f64) -> GatewayResult<StockProbe>;
}

/// Loyalty service as seen by the order service.
#[async_trait]
pub trait LoyaltyGateway: Send + Sync {
    /// Credit points earned by an order.
    async fn earn_points(
        &self,
        customer_id: &str,
        points: f64,
        order_id: &str,
        description: &str,
    ) -> GatewayResult<()>;
}

/// Third-party supplier as seen by the inventory service.
#[async_trait]
pub trait SupplierGateway: Send + Sync {
    /// Availability check for a supplier product.
    async fn check_stock(&self, product_id: &str, quantity: f64) -> GatewayResult<StockProbe>;
}
