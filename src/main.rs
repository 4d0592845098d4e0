use std::sync::Arc;

use expense_tracker::{config::Config, database::Gateway, routes};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let gateway = Gateway::open(&config);

    // A store that is down at startup is not fatal; requests report it later
    match gateway.health_check().await {
        Ok(()) => tracing::info!(
            location = %gateway.location().display(),
            "Database connection has been established"
        ),
        Err(e) => tracing::warn!(error = %e, "Database connection has failed"),
    }

    let app = routes::app(Arc::new(gateway));

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server running on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
