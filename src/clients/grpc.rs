//! gRPC-backed gateways.
//!
//! Thin adapters from the gateway traits to the typed resilient clients in
//! `warung-client`. Retry, timeout, and fallback behavior lives in the
//! clients; these adapters only shape requests and map status codes into
//! `GatewayError`.

use async_trait::async_trait;

use warung_client::proto::inventory::StockChangeRequest;
use warung_client::proto::kitchen::{CreateTicketRequest, TicketItem};
use warung_client::proto::loyalty::EarnPointsRequest;
use warung_client::{InventoryClient, KitchenClient, LoyaltyClient, SupplierClient};

use crate::interfaces::gateway::{
    GatewayResult, InventoryGateway, KitchenGateway, LoyaltyGateway, StockProbe, SupplierGateway,
};
use crate::interfaces::order::OrderLineItem;
use crate::interfaces::stock::Reference;

/// Kitchen gateway over the resilient kitchen client.
pub struct GrpcKitchenGateway {
    client: KitchenClient,
}

impl GrpcKitchenGateway {
    pub fn new(client: KitchenClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KitchenGateway for GrpcKitchenGateway {
    async fn open_ticket(
        &self,
        order_id: &str,
        table_number: Option<&str>,
        items: &[OrderLineItem],
    ) -> GatewayResult<()> {
        let request = CreateTicketRequest {
            order_id: order_id.to_string(),
            table_number: table_number.unwrap_or_default().to_string(),
            items: items
                .iter()
                .map(|item| TicketItem {
                    menu_id: item.menu_id.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    special_instructions: item
                        .special_instructions
                        .clone()
                        .unwrap_or_default(),
                })
                .collect(),
            priority: 0,
            notes: String::new(),
        };
        self.client.create_ticket(request).await?;
        Ok(())
    }

    async fn complete_for_order(&self, order_id: &str) -> GatewayResult<()> {
        let ticket = self.client.ticket_for_order(order_id).await?;
        self.client.complete_ticket(ticket.id).await?;
        Ok(())
    }
}

/// Inventory gateway over the resilient inventory client.
pub struct GrpcInventoryGateway {
    client: InventoryClient,
}

impl GrpcInventoryGateway {
    pub fn new(client: InventoryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InventoryGateway for GrpcInventoryGateway {
    async fn reduce_stock(
        &self,
        ingredient_id: &str,
        quantity: f64,
        reason: &str,
        reference: Reference,
    ) -> GatewayResult<()> {
        let request = StockChangeRequest {
            ingredient_id: ingredient_id.to_string(),
            quantity,
            reason: reason.to_string(),
            reference_id: reference.id,
            reference_type: reference.kind,
        };
        self.client.reduce_stock(request).await?;
        Ok(())
    }

    async fn check_stock(&self, ingredient_id: &str, quantity: f64) -> GatewayResult<StockProbe> {
        let check = self.client.check_stock(ingredient_id, quantity).await?;
        Ok(StockProbe {
            available: check.available,
            current_stock: check.current_stock,
            message: check.message,
        })
    }
}

/// Loyalty gateway over the resilient loyalty client.
pub struct GrpcLoyaltyGateway {
    client: LoyaltyClient,
}

impl GrpcLoyaltyGateway {
    pub fn new(client: LoyaltyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LoyaltyGateway for GrpcLoyaltyGateway {
    async fn earn_points(
        &self,
        customer_id: &str,
        points: f64,
        order_id: &str,
        description: &str,
    ) -> GatewayResult<()> {
        let request = EarnPointsRequest {
            customer_id: customer_id.to_string(),
            points,
            order_id: order_id.to_string(),
            description: description.to_string(),
        };
        self.client.earn_points(request).await?;
        Ok(())
    }
}

/// Supplier gateway over the resilient supplier client.
pub struct GrpcSupplierGateway {
    client: SupplierClient,
}

impl GrpcSupplierGateway {
    pub fn new(client: SupplierClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SupplierGateway for GrpcSupplierGateway {
    async fn check_stock(&self, product_id: &str, quantity: f64) -> GatewayResult<StockProbe> {
        let check = self.client.check_stock(product_id, quantity).await?;
        Ok(StockProbe {
            available: check.available,
            current_stock: check.current_stock,
            message: check.message,
        })
    }
}
