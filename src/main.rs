//! offerify server entry point.
//!
//! Starts the Axum HTTP server on PostgreSQL, or on the in-memory store when
//! persistence is disabled.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use offerify::api;
use offerify::app_state::AppState;
use offerify::config::{AppConfig, LogFormat};
use offerify::persistence::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    // Load configuration
    let config = AppConfig::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("TOKEN_SECRET not set; tokens are signed with the development secret");
    }
    tracing::info!(addr = %config.listen_addr, "starting offerify");

    // Build persistence layer
    let store: Arc<dyn Store> = if config.persistence_enabled {
        Arc::new(PgStore::connect(&config).await?)
    } else {
        tracing::warn!("persistence disabled; data lives in memory only");
        Arc::new(MemoryStore::new())
    };

    // Build application state
    let app_state = AppState::new(store, &config);

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let admin = app_state.auth.ensure_admin(email, password).await?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "admin account ready");
    }

    // Build router
    let app = api::build_router(&app_state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
