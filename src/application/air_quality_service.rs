// Air quality service - Use case for the current AQI reading
use crate::application::forecast_cache::{Cached, ForecastCache};
use crate::application::forecast_repository::{AirQualityRepository, Pm25Reading};
use crate::application::refresh_gate::RefreshGate;
use crate::domain::air_quality::AirQualityReport;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AirQualityService {
    repository: Arc<dyn AirQualityRepository>,
    cache: Arc<ForecastCache>,
    gate: Arc<RefreshGate>,
    max_age_ms: i64,
}

impl AirQualityService {
    pub fn new(
        repository: Arc<dyn AirQualityRepository>,
        cache: Arc<ForecastCache>,
        max_age_ms: i64,
        retry_backoff_ms: i64,
    ) -> Self {
        Self {
            repository,
            cache,
            gate: Arc::new(RefreshGate::new(retry_backoff_ms)),
            max_age_ms,
        }
    }

    pub async fn refresh(&self, now_ms: i64) -> anyhow::Result<()> {
        let mut permit = self.gate.enter().await;
        let outcome = self.fetch_and_store(now_ms).await;
        permit.record(now_ms, &outcome);
        outcome
    }

    pub async fn report(&self, now_ms: i64) -> anyhow::Result<AirQualityReport> {
        let cached = self.current_reading(now_ms).await?;
        Ok(AirQualityReport::new(
            cached.value.pm25,
            cached.value.observed_at_ms,
            cached.fetched_at_ms,
        ))
    }

    pub async fn is_cached(&self) -> bool {
        self.cache.air_quality().await.is_some()
    }

    async fn current_reading(&self, now_ms: i64) -> anyhow::Result<Cached<Pm25Reading>> {
        let is_fresh = |c: &Cached<Pm25Reading>| c.age_ms(now_ms) <= self.max_age_ms;

        if let Some(cached) = self.cache.air_quality().await.filter(is_fresh) {
            return Ok(cached);
        }

        let mut permit = self.gate.enter().await;
        let cached = self.cache.air_quality().await;
        if let Some(fresh) = cached.as_ref().filter(|c| is_fresh(c)) {
            return Ok(fresh.clone());
        }

        let outcome = if permit.backing_off(now_ms) {
            Err(anyhow::anyhow!("Air quality sensor failed recently, waiting before retrying"))
        } else {
            let outcome = self.fetch_and_store(now_ms).await;
            permit.record(now_ms, &outcome);
            outcome
        };

        match (outcome, cached) {
            (Ok(()), _) => self
                .cache
                .air_quality()
                .await
                .context("No air quality reading available"),
            (Err(e), Some(stale)) => {
                tracing::warn!("Air quality refresh failed, serving stale reading: {:#}", e);
                Ok(stale)
            }
            (Err(e), None) => Err(e.context("No air quality reading available")),
        }
    }

    async fn fetch_and_store(&self, now_ms: i64) -> anyhow::Result<()> {
        let reading = self.repository.fetch_pm25().await?;
        if !reading.pm25.is_finite() || reading.pm25 < 0.0 {
            anyhow::bail!("Sensor reported invalid PM2.5 value {}", reading.pm25);
        }

        tracing::info!("Fetched PM2.5 reading: {:.1} µg/m³", reading.pm25);
        self.cache.store_air_quality(reading, now_ms).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::air_quality::AqiCategory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedSensor {
        pm25: f64,
        calls: AtomicUsize,
        latency: Duration,
    }

    impl FixedSensor {
        fn reading(pm25: f64) -> Arc<Self> {
            Arc::new(Self {
                pm25,
                calls: AtomicUsize::new(0),
                latency: Duration::ZERO,
            })
        }
    }

    #[async_trait]
    impl AirQualityRepository for FixedSensor {
        async fn fetch_pm25(&self) -> anyhow::Result<Pm25Reading> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            Ok(Pm25Reading {
                pm25: self.pm25,
                observed_at_ms: 1_000,
            })
        }
    }

    fn service_over(sensor: &Arc<FixedSensor>) -> AirQualityService {
        AirQualityService::new(sensor.clone(), Arc::new(ForecastCache::new()), 60_000, 30_000)
    }

    #[tokio::test]
    async fn test_report_converts_pm25() {
        let service = service_over(&FixedSensor::reading(8.4));
        let report = service.report(5_000).await.unwrap();

        assert_eq!(report.aqi, Some(35));
        assert_eq!(report.category, Some(AqiCategory::Good));
        assert_eq!(report.observed_at_ms, 1_000);
        assert_eq!(report.fetched_at_ms, 5_000);
        assert!(service.is_cached().await);
    }

    #[tokio::test]
    async fn test_refresh_rejects_negative_reading() {
        let service = service_over(&FixedSensor::reading(-3.0));
        assert!(service.report(5_000).await.is_err());
        assert!(!service.is_cached().await);
    }

    #[tokio::test]
    async fn test_invalid_reading_backs_off_before_retrying() {
        let sensor = FixedSensor::reading(f64::NAN);
        let service = service_over(&sensor);

        assert!(service.report(5_000).await.is_err());
        assert!(service.report(6_000).await.is_err());
        assert_eq!(sensor.calls.load(Ordering::SeqCst), 1);

        assert!(service.report(35_000).await.is_err());
        assert_eq!(sensor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_cold_reports_share_one_fetch() {
        let sensor = Arc::new(FixedSensor {
            pm25: 12.0,
            calls: AtomicUsize::new(0),
            latency: Duration::from_millis(50),
        });
        let service = service_over(&sensor);

        let reports = futures::future::join_all((0..8).map(|_| service.report(5_000))).await;

        assert!(reports.iter().all(|r| r.is_ok()));
        assert_eq!(sensor.calls.load(Ordering::SeqCst), 1);
    }
}
