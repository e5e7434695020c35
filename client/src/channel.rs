//! gRPC channel establishment.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tonic::transport::Channel;
use tracing::{info, warn};

/// Connect to a gRPC endpoint.
///
/// The address should be in the format "host:port".
pub async fn connect_channel(address: &str) -> Result<Channel, String> {
    Channel::from_shared(format!("http://{}", address))
        .map_err(|e| format!("Invalid URI: {}", e))?
        .connect()
        .await
        .map_err(|e| format!("Connection failed: {}", e))
}

/// Backoff for gRPC connection retries at startup.
///
/// - Min delay: 100ms
/// - Max delay: 5s
/// - Max attempts: 30
/// - Jitter enabled
pub fn connection_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(30)
        .with_jitter()
}

/// Connect to a downstream service, retrying with exponential backoff.
///
/// Used at service startup so that deployment ordering across services does
/// not matter.
pub async fn connect_with_backoff(service: &str, address: &str) -> Result<Channel, String> {
    let addr = address.to_string();
    let channel = (|| {
        let addr = addr.clone();
        async move { connect_channel(&addr).await }
    })
    .retry(connection_backoff())
    .notify(|err: &String, dur: Duration| {
        warn!(service, error = %err, delay = ?dur, "Connection failed, retrying");
    })
    .await?;

    info!(service, address, "Connected");
    Ok(channel)
}
