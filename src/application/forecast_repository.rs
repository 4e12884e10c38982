// Repository traits for upstream forecast and sensor data
use crate::domain::time_series::Sample;
use async_trait::async_trait;

/// Latest PM2.5 reading from an air-quality sensor
#[derive(Debug, Clone, PartialEq)]
pub struct Pm25Reading {
    pub pm25: f64,
    pub observed_at_ms: i64,
}

#[async_trait]
pub trait UvForecastRepository: Send + Sync {
    /// Raw forecast points, in whatever order the upstream returns them
    async fn fetch_uv_forecast(&self) -> anyhow::Result<Vec<Sample>>;
}

#[async_trait]
pub trait AirQualityRepository: Send + Sync {
    async fn fetch_pm25(&self) -> anyhow::Result<Pm25Reading>;
}
