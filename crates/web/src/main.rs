//! Narinyland HTTP API.
//!
//! Serves the couple's shared configuration, points ledger, timeline,
//! gallery, coupons and love letters as JSON, and the uploaded media files.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use media_store::LocalStore;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting Narinyland server");

    // Connect to database
    let db = Database::connect_with_pool_size(&config.database_url, config.db_pool_size).await?;
    db.migrate().await?;

    // Open media store
    let store = LocalStore::new(&config.media_dir, &config.media_base_url).await?;
    let media_dir = store.root_dir().to_path_buf();
    let media_route = config.media_route();

    // Build application state
    let state = AppState::new(db.clone(), Arc::new(store), config.clone());

    // Build router
    let mut app = routes::router(config.max_upload_bytes);
    if let Some(route) = media_route {
        info!(route = %route, dir = %media_dir.display(), "Serving media files");
        app = app.nest_service(&route, ServeDir::new(media_dir));
    }
    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    info!(addr = %config.addr, "Narinyland server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
