// HTTP request handlers
use crate::infrastructure::json_mapper::{
    AirQualityDto, UvReportDto, air_quality_to_json, update_event_to_json, uv_report_to_json,
};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uv_cached: bool,
    pub air_quality_cached: bool,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uv_cached: state.uv_service.is_cached().await,
        air_quality_cached: state.air_quality_service.is_cached().await,
    })
}

pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// UV forecast with the smoothed curve, labels, crossings and current value
pub async fn uv_index(State(state): State<Arc<AppState>>) -> Result<Json<UvReportDto>, StatusCode> {
    match state.uv_service.report(now_ms()).await {
        Ok(report) => Ok(Json(uv_report_to_json(report))),
        Err(e) => {
            tracing::error!("Error building UV report: {:#}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

pub async fn air_quality(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AirQualityDto>, StatusCode> {
    match state.air_quality_service.report(now_ms()).await {
        Ok(report) => Ok(Json(air_quality_to_json(report))),
        Err(e) => {
            tracing::error!("Error building air quality report: {:#}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// Server-sent `update` events whenever a cached source is replaced
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.cache.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    let payload = update_event_to_json(&update);
                    match Event::default().event("update").json_data(payload) {
                        Ok(event) => yield Ok(event),
                        Err(e) => tracing::error!("Failed to encode update event: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event subscriber lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::air_quality_service::AirQualityService;
    use crate::application::forecast_cache::ForecastCache;
    use crate::application::forecast_repository::{
        AirQualityRepository, Pm25Reading, UvForecastRepository,
    };
    use crate::application::uv_service::{UvService, UvSettings};
    use crate::domain::curve_sampler::SamplerSettings;
    use crate::domain::time_series::{Sample, TimeSeries};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl UvForecastRepository for Offline {
        async fn fetch_uv_forecast(&self) -> anyhow::Result<Vec<Sample>> {
            anyhow::bail!("offline")
        }
    }

    #[async_trait]
    impl AirQualityRepository for Offline {
        async fn fetch_pm25(&self) -> anyhow::Result<Pm25Reading> {
            anyhow::bail!("offline")
        }
    }

    fn offline_state() -> Arc<AppState> {
        let cache = Arc::new(ForecastCache::new());
        let upstream = Arc::new(Offline);
        let settings = UvSettings {
            sampler: SamplerSettings::default(),
            threshold: 3.0,
            max_age_ms: 60_000,
            retry_backoff_ms: 60_000,
        };
        Arc::new(AppState {
            uv_service: UvService::new(upstream.clone(), cache.clone(), settings),
            air_quality_service: AirQualityService::new(upstream, cache.clone(), 60_000, 60_000),
            cache,
        })
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_bad_gateway() {
        let state = offline_state();
        assert_eq!(
            uv_index(State(state.clone())).await.err(),
            Some(StatusCode::BAD_GATEWAY)
        );
        assert_eq!(
            air_quality(State(state)).await.err(),
            Some(StatusCode::BAD_GATEWAY)
        );
    }

    #[tokio::test]
    async fn test_health_reports_cache_state() {
        let state = offline_state();
        let Json(health) = health_check(State(state.clone())).await;
        assert!(!health.uv_cached);

        let series = TimeSeries::new(vec![Sample::new(0, 1.0)]).unwrap();
        state.cache.store_uv_forecast(series, now_ms()).await;
        let Json(health) = health_check(State(state)).await;
        assert!(health.uv_cached);
        assert!(!health.air_quality_cached);
    }

    #[tokio::test]
    async fn test_version_uses_package_metadata() {
        let Json(info) = version().await;
        assert_eq!(info.name, "uv-dashboard");
    }
}
