// UV service - Use case for turning the cached forecast into a chart report
use crate::application::forecast_cache::{Cached, ForecastCache};
use crate::application::forecast_repository::UvForecastRepository;
use crate::application::refresh_gate::RefreshGate;
use crate::domain::crossing::{Direction, find_crossing, find_crossings};
use crate::domain::curve_model::CurveModel;
use crate::domain::curve_sampler::{CurveSampler, NamedInstant, SamplerSettings};
use crate::domain::error::InvalidInputError;
use crate::domain::estimator::estimate_at;
use crate::domain::time_series::TimeSeries;
use crate::domain::uv::{CurrentUv, UvReport, UvRisk};
use anyhow::Context;
use std::sync::Arc;

pub const RISE_LABEL: &str = "rise";
pub const FALL_LABEL: &str = "fall";

#[derive(Debug, Clone, PartialEq)]
pub struct UvSettings {
    pub sampler: SamplerSettings,
    /// UV index at which sun protection is advised
    pub threshold: f64,
    pub max_age_ms: i64,
    /// Request-time refreshes are skipped this long after a failed attempt.
    pub retry_backoff_ms: i64,
}

#[derive(Clone)]
pub struct UvService {
    repository: Arc<dyn UvForecastRepository>,
    cache: Arc<ForecastCache>,
    gate: Arc<RefreshGate>,
    settings: UvSettings,
}

impl UvService {
    pub fn new(
        repository: Arc<dyn UvForecastRepository>,
        cache: Arc<ForecastCache>,
        settings: UvSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            gate: Arc::new(RefreshGate::new(settings.retry_backoff_ms)),
            settings,
        }
    }

    /// Fetch a fresh forecast and replace the cached one. Waits for a
    /// refresh already in flight instead of running alongside it.
    pub async fn refresh(&self, now_ms: i64) -> anyhow::Result<()> {
        let mut permit = self.gate.enter().await;
        let outcome = self.fetch_and_store(now_ms).await;
        permit.record(now_ms, &outcome);
        outcome
    }

    /// Report for `now_ms`, refreshing first when the cache is empty or
    /// older than `max_age_ms`. A stale forecast is served if that fails.
    pub async fn report(&self, now_ms: i64) -> anyhow::Result<UvReport> {
        let cached = self.current_forecast(now_ms).await?;
        Ok(build_uv_report(&cached.value, cached.fetched_at_ms, &self.settings, now_ms)?)
    }

    pub async fn is_cached(&self) -> bool {
        self.cache.uv_forecast().await.is_some()
    }

    async fn current_forecast(&self, now_ms: i64) -> anyhow::Result<Cached<TimeSeries>> {
        if let Some(cached) = self.fresh_forecast(now_ms).await {
            return Ok(cached);
        }

        let mut permit = self.gate.enter().await;
        // another request may have refreshed while this one waited
        let cached = self.cache.uv_forecast().await;
        if let Some(fresh) = cached.as_ref().filter(|c| self.is_fresh(c, now_ms)) {
            return Ok(fresh.clone());
        }

        let outcome = if permit.backing_off(now_ms) {
            Err(anyhow::anyhow!("UV upstream failed recently, waiting before retrying"))
        } else {
            let outcome = self.fetch_and_store(now_ms).await;
            permit.record(now_ms, &outcome);
            outcome
        };

        match (outcome, cached) {
            (Ok(()), _) => self
                .cache
                .uv_forecast()
                .await
                .context("No UV forecast available"),
            (Err(e), Some(stale)) => {
                tracing::warn!("UV refresh failed, serving stale forecast: {:#}", e);
                Ok(stale)
            }
            (Err(e), None) => Err(e.context("No UV forecast available")),
        }
    }

    async fn fresh_forecast(&self, now_ms: i64) -> Option<Cached<TimeSeries>> {
        self.cache
            .uv_forecast()
            .await
            .filter(|c| self.is_fresh(c, now_ms))
    }

    fn is_fresh(&self, cached: &Cached<TimeSeries>, now_ms: i64) -> bool {
        cached.age_ms(now_ms) <= self.settings.max_age_ms
    }

    async fn fetch_and_store(&self, now_ms: i64) -> anyhow::Result<()> {
        let raw = self.repository.fetch_uv_forecast().await?;
        let raw_len = raw.len();
        let series = TimeSeries::from_unsorted(raw).context("Upstream UV forecast is invalid")?;

        tracing::info!(
            "Fetched UV forecast: {} points ({} after dedup)",
            raw_len,
            series.len()
        );
        self.cache.store_uv_forecast(series, now_ms).await;
        Ok(())
    }
}

/// One full pass of the curve pipeline over an immutable forecast.
pub fn build_uv_report(
    series: &TimeSeries,
    fetched_at_ms: i64,
    settings: &UvSettings,
    now_ms: i64,
) -> Result<UvReport, InvalidInputError> {
    let model = CurveModel::build(series);
    let sampler = CurveSampler::new(&model, &settings.sampler)?;

    let samples = series.samples();
    let protection_start_ms = find_crossing(samples, settings.threshold, Direction::Rising);
    let protection_end_ms = find_crossing(samples, settings.threshold, Direction::Falling);

    let named: Vec<NamedInstant> = protection_start_ms
        .map(|t| NamedInstant::new(RISE_LABEL, t))
        .into_iter()
        .chain(protection_end_ms.map(|t| NamedInstant::new(FALL_LABEL, t)))
        .collect();

    let mut sampled = sampler.sample(&named);
    // spline overshoot can dip below zero around sunrise and sunset
    for point in &mut sampled.dense {
        point.value = point.value.max(0.0);
    }
    for label in &mut sampled.labels {
        label.value = label.value.max(0.0);
    }

    let current = match estimate_at(&sampled.dense, now_ms) {
        Some(value) => Some((value, true)),
        None => series.last().map(|s| (s.value, false)),
    }
    .map(|(value, estimated)| CurrentUv {
        value,
        estimated,
        risk: UvRisk::from_index(value),
    });

    Ok(UvReport {
        fetched_at_ms,
        threshold: settings.threshold,
        smoothing: model.smoothing(),
        samples: samples.to_vec(),
        dense: sampled.dense,
        labels: sampled.labels,
        crossings: find_crossings(samples, settings.threshold),
        protection_start_ms,
        protection_end_ms,
        current,
        peak: series.peak().copied(),
    })
}
