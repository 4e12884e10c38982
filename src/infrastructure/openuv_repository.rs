// OpenUV forecast repository implementation
use crate::application::forecast_repository::UvForecastRepository;
use crate::domain::time_series::Sample;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct OpenUvRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    result: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    uv: f64,
    uv_time: String,
}

impl OpenUvRepository {
    pub fn new(base_url: String, api_key: String, latitude: f64, longitude: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            latitude,
            longitude,
        }
    }

    fn build_forecast_url(&self, at: DateTime<Utc>) -> String {
        let dt = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            "{}/forecast?lat={}&lng={}&dt={}",
            self.base_url,
            self.latitude,
            self.longitude,
            urlencoding::encode(&dt)
        )
    }
}

/// Entries with an unparseable `uv_time` are dropped rather than failing the
/// whole forecast.
fn parse_forecast(response: ForecastResponse) -> Vec<Sample> {
    response
        .result
        .into_iter()
        .filter_map(|entry| match DateTime::parse_from_rfc3339(&entry.uv_time) {
            Ok(time) => Some(Sample::new(time.timestamp_millis(), entry.uv)),
            Err(e) => {
                tracing::warn!(
                    "Skipping forecast entry with bad uv_time {:?}: {}",
                    entry.uv_time,
                    e
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl UvForecastRepository for OpenUvRepository {
    async fn fetch_uv_forecast(&self) -> Result<Vec<Sample>> {
        let url = self.build_forecast_url(Utc::now());
        tracing::debug!("Requesting UV forecast: {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-access-token", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to OpenUV")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenUV request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<ForecastResponse>()
            .await
            .context("Failed to parse OpenUV response")?;

        Ok(parse_forecast(data))
    }
}
