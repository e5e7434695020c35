//! warung-kitchen: the production ticket service.
//!
//! Owns ticket and chef rows.

use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use warung::bootstrap::init_tracing;
use warung::config::Config;
use warung::handlers::KitchenHandler;
use warung::kitchen::TicketBoard;
use warung::proto::kitchen::kitchen_server::KitchenServer;
use warung::storage::init_kitchen_store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = Config::load(None)?;

    let store = init_kitchen_store(&config.storage).await?;
    let board = Arc::new(TicketBoard::new(store));

    let addr: std::net::SocketAddr = config.server.addr(config.server.kitchen_port).parse()?;
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<KitchenServer<KitchenHandler>>()
        .await;

    info!(%addr, "Kitchen service listening");
    Server::builder()
        .add_service(health_service)
        .add_service(KitchenServer::new(KitchenHandler::new(board)))
        .serve(addr)
        .await?;
    Ok(())
}
