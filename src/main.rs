use tracing_subscriber::EnvFilter;
use viewer_core::AppConfig;

const DEFAULT_LOG_FILTER: &str = "reddit_viewer=info,server=info,reddit_client=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Reddit viewer");

    let config = AppConfig::load().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    server::start_server(config).await?;
    Ok(())
}
