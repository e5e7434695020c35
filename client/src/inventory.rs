//! Typed client for the Inventory service.

use tonic::transport::Channel;
use tonic::{Request, Status};

use crate::auth::Identity;
use crate::call::RetryPolicy;
use crate::channel::connect_with_backoff;
use crate::proto::inventory::inventory_client::InventoryClient as GrpcClient;
use crate::proto::inventory::{
    CheckStockRequest, StockChangeRequest, StockCheck, StockMovement,
};

/// Inventory client with retry applied to every call.
#[derive(Clone)]
pub struct InventoryClient {
    inner: GrpcClient<Channel>,
    policy: RetryPolicy,
    identity: Identity,
}

impl InventoryClient {
    pub fn new(channel: Channel, policy: RetryPolicy, identity: Identity) -> Self {
        Self {
            inner: GrpcClient::new(channel),
            policy,
            identity,
        }
    }

    /// Connect to the inventory service, retrying with backoff at startup.
    pub async fn connect(
        address: &str,
        policy: RetryPolicy,
        identity: Identity,
    ) -> Result<Self, String> {
        let channel = connect_with_backoff("inventory", address).await?;
        Ok(Self::new(channel, policy, identity))
    }

    fn request_for<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        self.identity.apply(&mut request);
        request
    }

    pub async fn check_stock(
        &self,
        ingredient_id: &str,
        quantity: f64,
    ) -> Result<StockCheck, Status> {
        let message = CheckStockRequest {
            ingredient_id: ingredient_id.to_string(),
            quantity,
        };
        self.policy
            .run("inventory.check_stock", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.check_stock(request).await.map(|r| r.into_inner()) }
            })
            .await
    }

    pub async fn reduce_stock(
        &self,
        message: StockChangeRequest,
    ) -> Result<StockMovement, Status> {
        self.policy
            .run("inventory.reduce_stock", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.reduce_stock(request).await.map(|r| r.into_inner()) }
            })
            .await
    }

    pub async fn add_stock(&self, message: StockChangeRequest) -> Result<StockMovement, Status> {
        self.policy
            .run("inventory.add_stock", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.add_stock(request).await.map(|r| r.into_inner()) }
            })
            .await
    }
}
