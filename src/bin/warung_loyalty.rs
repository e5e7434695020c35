//! warung-loyalty: the customer points service.
//!
//! Owns loyalty account and transaction rows.

use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use warung::bootstrap::init_tracing;
use warung::config::Config;
use warung::handlers::LoyaltyHandler;
use warung::loyalty::LoyaltyLedger;
use warung::proto::loyalty::loyalty_server::LoyaltyServer;
use warung::storage::init_loyalty_store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = Config::load(None)?;

    let store = init_loyalty_store(&config.storage).await?;
    let ledger = Arc::new(LoyaltyLedger::new(store, config.loyalty.clone()));

    let addr: std::net::SocketAddr = config.server.addr(config.server.loyalty_port).parse()?;
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<LoyaltyServer<LoyaltyHandler>>()
        .await;

    info!(%addr, "Loyalty service listening");
    Server::builder()
        .add_service(health_service)
        .add_service(LoyaltyServer::new(LoyaltyHandler::new(ledger)))
        .serve(addr)
        .await?;
    Ok(())
}
