//! warung-order: the order service.
//!
//! Owns order and menu-catalog rows, and runs the fulfillment
//! orchestration against the kitchen, inventory, and loyalty services.
//! Downstream connections are established at startup with backoff so
//! deployment ordering does not matter.

use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use warung::bootstrap::init_tracing;
use warung::clients::{GrpcInventoryGateway, GrpcKitchenGateway, GrpcLoyaltyGateway};
use warung::config::Config;
use warung::handlers::OrderHandler;
use warung::orchestration::OrderOrchestrator;
use warung::proto::order::orders_server::OrdersServer;
use warung::storage::init_order_stores;
use warung_client::{Identity, InventoryClient, KitchenClient, LoyaltyClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = Config::load(None)?;

    let (orders, menus) = init_order_stores(&config.storage).await?;

    let policy = config.call.policy();
    let identity = Identity::service("svc-order");
    let kitchen = KitchenClient::connect(
        &config.downstream.kitchen.address,
        policy.clone(),
        identity.clone(),
    )
    .await?;
    let inventory = InventoryClient::connect(
        &config.downstream.inventory.address,
        policy.clone(),
        identity.clone(),
    )
    .await?;
    let loyalty =
        LoyaltyClient::connect(&config.downstream.loyalty.address, policy, identity).await?;

    let orchestrator = Arc::new(OrderOrchestrator::new(
        orders,
        menus,
        Arc::new(GrpcKitchenGateway::new(kitchen)),
        Arc::new(GrpcInventoryGateway::new(inventory)),
        Arc::new(GrpcLoyaltyGateway::new(loyalty)),
        config.pricing.clone(),
    ));

    let addr: std::net::SocketAddr = config.server.addr(config.server.order_port).parse()?;
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<OrdersServer<OrderHandler>>()
        .await;

    info!(%addr, "Order service listening");
    Server::builder()
        .add_service(health_service)
        .add_service(OrdersServer::new(OrderHandler::new(orchestrator)))
        .serve(addr)
        .await?;
    Ok(())
}
