//! QuickDocs gateway binary.

use quickdocs_gateway::{Gateway, GatewayConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quickdocs_gateway=info,tower_http=info")),
        )
        .init();

    let config = GatewayConfig::from_env();
    let mut gateway = Gateway::new(config);
    gateway.init().await?;
    gateway.serve().await?;

    Ok(())
}
