use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use visitor_counter::api;
use visitor_counter::config::{Config, CONNECTION_ENV};
use visitor_counter::counter::VisitorCounter;
use visitor_counter::storage::TableConnector;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // The store is connected lazily by the first visit; a missing
    // connection string fails requests, not startup.
    if config.store.connection_string.is_none() {
        warn!(
            "{} is not set; visit requests will fail until it is configured",
            CONNECTION_ENV
        );
    }
    let connector = Arc::new(TableConnector::new(config.store.clone()));
    let counter = VisitorCounter::new(connector);

    if config.cors.allows_any_origin() {
        info!("CORS: any origin may call the counter");
    } else {
        info!("CORS: allowed origins {:?}", config.cors.allowed_origins);
    }

    let router = api::create_counter_router(counter, &config.cors);

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Visitor counter listening on http://{}", addr);
    info!("   - GET http://{}{}", addr, api::VISIT_PATH);

    axum::serve(listener, router).await?;

    Ok(())
}
