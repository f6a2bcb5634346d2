//! Vitrine API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod identity;
mod middleware;
mod state;

use tracing::info;
use vitrine_core::AppError;

use crate::api_config::{ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        api_services::connect_and_migrate(database_url, config.database_max_connections).await?;
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = api_services::build_app_state(&config).await?;
    let app = api_router::build_router(
        app_state,
        &config.cors_origins(),
        config.identity_header.as_str(),
    )?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "vitrine api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
