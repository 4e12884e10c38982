// Application state for HTTP handlers
use crate::application::air_quality_service::AirQualityService;
use crate::application::forecast_cache::ForecastCache;
use crate::application::uv_service::UvService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub uv_service: UvService,
    pub air_quality_service: AirQualityService,
    pub cache: Arc<ForecastCache>,
}
