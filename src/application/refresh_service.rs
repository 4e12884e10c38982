// Background refresh of upstream data on a fixed interval
use crate::application::air_quality_service::AirQualityService;
use crate::application::uv_service::UvService;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct RefreshService {
    uv_service: UvService,
    air_quality_service: AirQualityService,
    interval: Duration,
}

impl RefreshService {
    pub fn new(
        uv_service: UvService,
        air_quality_service: AirQualityService,
        interval: Duration,
    ) -> Self {
        Self {
            uv_service,
            air_quality_service,
            interval,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                self.refresh_all(chrono::Utc::now().timestamp_millis()).await;
            }
        })
    }

    /// Refresh both sources concurrently; failures are logged, the previous
    /// cache entries stay in place.
    pub async fn refresh_all(&self, now_ms: i64) {
        let (uv, air) = tokio::join!(
            self.uv_service.refresh(now_ms),
            self.air_quality_service.refresh(now_ms)
        );

        if let Err(e) = uv {
            tracing::error!("Error refreshing UV forecast: {:#}", e);
        }
        if let Err(e) = air {
            tracing::error!("Error refreshing air quality: {:#}", e);
        }
    }
}
