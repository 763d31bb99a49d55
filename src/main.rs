use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;
use vies_gateway::config::GatewayConfig;
use vies_gateway::gateway::{self, ServeError};

#[tokio::main]
async fn main() -> Result<(), ServeError> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env()?;
    gateway::serve(config).await
}
