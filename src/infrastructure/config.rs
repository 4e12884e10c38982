use crate::application::uv_service::UvSettings;
use crate::domain::curve_sampler::{MINUTE_MS, SamplerSettings};
use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub openuv: OpenUvSettings,
    pub purpleair: PurpleAirSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenUvSettings {
    #[serde(default = "default_openuv_url")]
    pub base_url: String,
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PurpleAirSettings {
    #[serde(default = "default_purpleair_url")]
    pub base_url: String,
    pub api_key: String,
    pub sensor_index: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
    /// Fixed offset for labels and hour marks. Daylight saving is not applied.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_hour_suppression_minutes")]
    pub hour_suppression_minutes: i64,
    #[serde(default = "default_uv_threshold")]
    pub uv_threshold: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            step_minutes: default_step_minutes(),
            utc_offset_minutes: 0,
            hour_suppression_minutes: default_hour_suppression_minutes(),
            uv_threshold: default_uv_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_age_secs: default_max_age_secs(),
            retry_backoff_secs: default_retry_backoff_secs(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_openuv_url() -> String {
    "https://api.openuv.io/api/v1".to_string()
}

fn default_purpleair_url() -> String {
    "https://api.purpleair.com/v1".to_string()
}

fn default_step_minutes() -> i64 {
    10
}

fn default_hour_suppression_minutes() -> i64 {
    30
}

fn default_uv_threshold() -> f64 {
    3.0
}

fn default_interval_secs() -> u64 {
    900
}

fn default_max_age_secs() -> u64 {
    1800
}

fn default_retry_backoff_secs() -> u64 {
    120
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (-90.0..=90.0).contains(&self.openuv.latitude),
            "openuv.latitude must be within ±90, got {}",
            self.openuv.latitude
        );
        anyhow::ensure!(
            (-180.0..=180.0).contains(&self.openuv.longitude),
            "openuv.longitude must be within ±180, got {}",
            self.openuv.longitude
        );
        anyhow::ensure!(self.chart.step_minutes > 0, "chart.step_minutes must be positive");
        anyhow::ensure!(
            self.chart.hour_suppression_minutes >= 0,
            "chart.hour_suppression_minutes must not be negative"
        );
        anyhow::ensure!(
            self.chart.uv_threshold.is_finite() && self.chart.uv_threshold >= 0.0,
            "chart.uv_threshold must be a non-negative number"
        );
        anyhow::ensure!(self.refresh.interval_secs > 0, "refresh.interval_secs must be positive");
        self.utc_offset()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.chart.utc_offset_minutes * 60).with_context(|| {
            format!(
                "chart.utc_offset_minutes out of range: {}",
                self.chart.utc_offset_minutes
            )
        })
    }

    pub fn uv_settings(&self) -> anyhow::Result<UvSettings> {
        Ok(UvSettings {
            sampler: SamplerSettings {
                step_ms: self.chart.step_minutes * MINUTE_MS,
                utc_offset: self.utc_offset()?,
                hour_suppression_ms: self.chart.hour_suppression_minutes * MINUTE_MS,
            },
            threshold: self.chart.uv_threshold,
            max_age_ms: self.max_age_ms(),
            retry_backoff_ms: self.retry_backoff_ms(),
        })
    }

    pub fn max_age_ms(&self) -> i64 {
        secs_to_ms(self.refresh.max_age_secs)
    }

    pub fn retry_backoff_ms(&self) -> i64 {
        secs_to_ms(self.refresh.retry_backoff_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs)
        .unwrap_or(i64::MAX / 1000)
        .saturating_mul(1000)
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__SECTION__KEY`
/// environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}
