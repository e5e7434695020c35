//! Typed client for the third-party supplier.
//!
//! Newer supplier deployments serve the `CheckStock` shape; older ones only
//! serve `GetInventory`. The stock check therefore composes the fallback
//! combinator around the retry loop: the preferred shape is retried first,
//! and only a permanently failing primary falls through to the legacy shape.

use tonic::transport::Channel;
use tonic::Status;

use crate::call::{with_fallback, RetryPolicy};
use crate::channel::connect_with_backoff;
use crate::proto::supplier::supplier_client::SupplierClient as GrpcClient;
use crate::proto::supplier::{
    SupplierCheckRequest, SupplierInventoryRequest, SupplierStockCheck,
};

/// Supplier client with retry and legacy-shape fallback.
#[derive(Clone)]
pub struct SupplierClient {
    inner: GrpcClient<Channel>,
    policy: RetryPolicy,
}

impl SupplierClient {
    pub fn new(channel: Channel, policy: RetryPolicy) -> Self {
        Self {
            inner: GrpcClient::new(channel),
            policy,
        }
    }

    /// Connect to the supplier, retrying with backoff at startup.
    pub async fn connect(address: &str, policy: RetryPolicy) -> Result<Self, String> {
        let channel = connect_with_backoff("supplier", address).await?;
        Ok(Self::new(channel, policy))
    }

    /// Check supplier stock, falling back to the legacy inventory query
    /// when the preferred shape is unavailable.
    pub async fn check_stock(
        &self,
        product_id: &str,
        quantity: f64,
    ) -> Result<SupplierStockCheck, Status> {
        with_fallback(
            "supplier.check_stock",
            || self.check_stock_preferred(product_id, quantity),
            || self.check_stock_legacy(product_id, quantity),
        )
        .await
    }

    async fn check_stock_preferred(
        &self,
        product_id: &str,
        quantity: f64,
    ) -> Result<SupplierStockCheck, Status> {
        let request = SupplierCheckRequest {
            product_id: product_id.to_string(),
            quantity,
        };
        self.policy
            .run("supplier.check_stock", || {
                let mut client = self.inner.clone();
                let request = request.clone();
                async move { client.check_stock(request).await.map(|r| r.into_inner()) }
            })
            .await
    }

    async fn check_stock_legacy(
        &self,
        product_id: &str,
        quantity: f64,
    ) -> Result<SupplierStockCheck, Status> {
        let request = SupplierInventoryRequest {
            product_id: product_id.to_string(),
        };
        let inventory = self
            .policy
            .run("supplier.get_inventory", || {
                let mut client = self.inner.clone();
                let request = request.clone();
                async move { client.get_inventory(request).await.map(|r| r.into_inner()) }
            })
            .await?;

        let available = inventory.stock >= quantity;
        Ok(SupplierStockCheck {
            available,
            current_stock: inventory.stock,
            requested_quantity: quantity,
            message: if available {
                format!("Stock available: {} units", inventory.stock)
            } else {
                format!(
                    "Insufficient stock. Available: {} units, requested: {} units",
                    inventory.stock, quantity
                )
            },
        })
    }
}
