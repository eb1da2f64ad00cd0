use anyhow::Context;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seller_inventory::{
    config::Config,
    controllers,
    models::RowQuery,
    services::HttpInventoryApi,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;

    // JSON logs in production, human-readable output elsewhere
    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    if config.app.environment == "production" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!(environment = %config.app.environment, "Starting seller inventory service");

    // Client for the backend inventory REST API
    let api = HttpInventoryApi::from_config(&config.inventory_api, &config.circuit_breaker)
        .context("failed to build inventory API client")?;
    info!("Inventory API client ready: {}", config.inventory_api.base_url);

    // Create the shared application state
    let app_state = AppState::new(Arc::new(api), config.table.clone());

    // The first page is best effort: the dashboard can retry through /rows/load.
    let first_page = RowQuery::first_page(config.table.default_page_size);
    if let Err(e) = app_state.inventory.load(first_page).await {
        warn!("Initial inventory load failed: {}", e);
    }

    // --- Start the web server ---

    let app = Router::new()
        .route("/", get(|| async { "Seller Inventory API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes::<HttpInventoryApi>())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
