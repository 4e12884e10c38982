// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{Router, routing::get};
use std::{net::SocketAddr, sync::Arc};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::air_quality_service::AirQualityService;
use crate::application::forecast_cache::ForecastCache;
use crate::application::refresh_service::RefreshService;
use crate::application::uv_service::UvService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::openuv_repository::OpenUvRepository;
use crate::infrastructure::purpleair_repository::PurpleAirRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{air_quality, events, health_check, uv_index, version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;
    let uv_settings = config.uv_settings()?;

    // Create repositories (infrastructure layer)
    let uv_repository = Arc::new(OpenUvRepository::new(
        config.openuv.base_url.clone(),
        config.openuv.api_key.clone(),
        config.openuv.latitude,
        config.openuv.longitude,
    ));
    let air_quality_repository = Arc::new(PurpleAirRepository::new(
        config.purpleair.base_url.clone(),
        config.purpleair.api_key.clone(),
        config.purpleair.sensor_index,
    ));

    // Create services (application layer)
    let cache = Arc::new(ForecastCache::new());
    let uv_service = UvService::new(uv_repository, cache.clone(), uv_settings);
    let air_quality_service = AirQualityService::new(
        air_quality_repository,
        cache.clone(),
        config.max_age_ms(),
        config.retry_backoff_ms(),
    );

    RefreshService::new(
        uv_service.clone(),
        air_quality_service.clone(),
        config.refresh_interval(),
    )
    .spawn();

    // Create application state
    let state = Arc::new(AppState {
        uv_service,
        air_quality_service,
        cache,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/version", get(version))
        .route("/api/uvindex", get(uv_index))
        .route("/api/airquality", get(air_quality))
        .route("/api/events", get(events))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting uv-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
