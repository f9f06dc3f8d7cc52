//! Gateway Harness Server binary.

use gateway_harness_server::{HarnessConfig, HarnessServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = HarnessConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    // Create and run server
    let server = HarnessServer::new(config);
    server.run().await?;

    Ok(())
}
