use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_gateway::config::Cli;
use weather_gateway::server::Server;
use weather_gateway::OpenWeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("weather_gateway={},tower_http=debug", cli.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli
        .app_config()
        .validated()
        .context("Failed to load configuration")?;

    tracing::info!("Starting weather gateway");
    tracing::info!(
        "Configuration: port={}, rate_limit_per_second={}, api_url={}, units={}",
        config.port,
        config.rate_limit_per_second,
        config.openweathermap_api_url,
        config.unit_of_measurement
    );

    let server = Server::new(config, Arc::new(OpenWeatherClient::new()));

    server.run().await.context("Server error")?;

    Ok(())
}
