//! warung-inventory: the stock ledger service.
//!
//! Owns ingredient and stock-movement rows. Optionally integrates with the
//! third-party supplier when `downstream.supplier` is configured.

use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use warung::bootstrap::init_tracing;
use warung::clients::GrpcSupplierGateway;
use warung::config::Config;
use warung::handlers::InventoryHandler;
use warung::interfaces::SupplierGateway;
use warung::ledger::StockLedger;
use warung::proto::inventory::inventory_server::InventoryServer;
use warung::storage::init_stock_store;
use warung_client::SupplierClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = Config::load(None)?;

    let store = init_stock_store(&config.storage).await?;
    let ledger = Arc::new(StockLedger::new(store));

    let supplier: Option<Arc<dyn SupplierGateway>> = match &config.downstream.supplier {
        Some(endpoint) => {
            let client = SupplierClient::connect(&endpoint.address, config.call.policy()).await?;
            Some(Arc::new(GrpcSupplierGateway::new(client)))
        }
        None => None,
    };

    let addr: std::net::SocketAddr = config.server.addr(config.server.inventory_port).parse()?;
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<InventoryServer<InventoryHandler>>()
        .await;

    info!(%addr, "Inventory service listening");
    Server::builder()
        .add_service(health_service)
        .add_service(InventoryServer::new(InventoryHandler::new(
            ledger, supplier,
        )))
        .serve(addr)
        .await?;
    Ok(())
}
