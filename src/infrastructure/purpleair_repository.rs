// PurpleAir sensor repository implementation
use crate::application::forecast_repository::{AirQualityRepository, Pm25Reading};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

const PM25_FIELD: &str = "pm2.5";

#[derive(Debug, Clone)]
pub struct PurpleAirRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sensor_index: u64,
}

#[derive(Debug, Deserialize)]
struct SensorResponse {
    /// Unix seconds
    data_time_stamp: i64,
    sensor: SensorFields,
}

#[derive(Debug, Deserialize)]
struct SensorFields {
    #[serde(rename = "pm2.5")]
    pm25: Option<f64>,
}

impl PurpleAirRepository {
    pub fn new(base_url: String, api_key: String, sensor_index: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            sensor_index,
        }
    }

    fn build_sensor_url(&self) -> String {
        format!(
            "{}/sensors/{}?fields={}",
            self.base_url,
            self.sensor_index,
            urlencoding::encode(PM25_FIELD)
        )
    }
}

fn parse_sensor(response: SensorResponse) -> Result<Pm25Reading> {
    let pm25 = response
        .sensor
        .pm25
        .context("Sensor response has no pm2.5 value")?;
    Ok(Pm25Reading {
        pm25,
        observed_at_ms: response.data_time_stamp.saturating_mul(1000),
    })
}

#[async_trait]
impl AirQualityRepository for PurpleAirRepository {
    async fn fetch_pm25(&self) -> Result<Pm25Reading> {
        let url = self.build_sensor_url();
        tracing::debug!("Requesting sensor reading: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to PurpleAir")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("PurpleAir request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<SensorResponse>()
            .await
            .context("Failed to parse PurpleAir response")?;

        parse_sensor(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sensor_url() {
        let repo = PurpleAirRepository::new(
            "https://api.purpleair.com/v1".to_string(),
            "k".to_string(),
            131075,
        );
        assert_eq!(
            repo.build_sensor_url(),
            "https://api.purpleair.com/v1/sensors/131075?fields=pm2.5"
        );
    }

    #[test]
    fn test_parse_sensor_response() {
        let body = r#"{
            "api_version": "V1.0.11-0.0.49",
            "time_stamp": 1717243000,
            "data_time_stamp": 1717242980,
            "sensor": {"sensor_index": 131075, "pm2.5": 6.3}
        }"#;
        let response: SensorResponse = serde_json::from_str(body).unwrap();
        let reading = parse_sensor(response).unwrap();

        assert_eq!(reading.pm25, 6.3);
        assert_eq!(reading.observed_at_ms, 1_717_242_980_000);
    }

    #[test]
    fn test_missing_pm25_is_an_error() {
        let body = r#"{"data_time_stamp": 1, "sensor": {"sensor_index": 7}}"#;
        let response: SensorResponse = serde_json::from_str(body).unwrap();
        assert!(parse_sensor(response).is_err());
    }
}
