// HTTP telemetry API - login and bulk data against the platform's REST endpoints

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::telemetry_api::{BulkData, TelemetryApi};
use crate::domain::telemetry::Reading;
use crate::domain::usage::DeviceStatsRecord;
use crate::errors::TelemetryError;

pub struct HttpTelemetryApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTelemetryApi {
    pub fn new(base_url: &str) -> Self {
        HttpTelemetryApi {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

/// Payload of the bulk endpoint. Fields the monitor does not consume
/// (request counters, report windows) are simply not mapped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkResponse {
    #[serde(default)]
    device_stats: Vec<DeviceStatsRecord>,
    #[serde(default)]
    temperature_data: Vec<WireReading>,
    #[serde(default)]
    load_data: Vec<WireReading>,
    #[serde(default)]
    fuel_data: Vec<WireReading>,
}

#[derive(Debug, Deserialize)]
struct WireReading {
    time: String,
    value: f64,
    #[allow(dead_code)]
    #[serde(default)]
    unit: Option<String>,
}

impl From<WireReading> for Reading {
    fn from(wire: WireReading) -> Self {
        Reading::new(wire.time, wire.value)
    }
}

fn into_readings(wire: Vec<WireReading>) -> Vec<Reading> {
    wire.into_iter().map(Reading::from).collect()
}

#[async_trait]
impl TelemetryApi for HttpTelemetryApi {
    async fn login(&self, username: &str, password: &str) -> Result<String, TelemetryError> {
        let url = format!("{}/auth/login", self.base_url);
        tracing::debug!(url = %url, username = username, "requesting session token");

        let response = self
            .client
            .get(&url)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TelemetryError::Auth("invalid device credentials".to_string()));
        }
        if !status.is_success() {
            return Err(TelemetryError::Transport(format!(
                "login returned status {}",
                status
            )));
        }

        // The token is the response body itself, not a JSON envelope.
        Ok(response.text().await?)
    }

    async fn fetch_bulk(&self, token: &str) -> Result<BulkData, TelemetryError> {
        let url = format!("{}/data", self.base_url);
        tracing::debug!(url = %url, "fetching bulk telemetry");

        let response = self.client.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TelemetryError::Auth("session token rejected".to_string()));
        }
        if !status.is_success() {
            return Err(TelemetryError::Transport(format!(
                "bulk request returned status {}",
                status
            )));
        }

        let body = response.text().await?;
        let bulk: BulkResponse = serde_json::from_str(&body)?;

        Ok(BulkData {
            device_stats: bulk.device_stats,
            temperature: into_readings(bulk.temperature_data),
            load: into_readings(bulk.load_data),
            fuel: into_readings(bulk.fuel_data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_response_decodes_platform_payload() {
        let raw = r#"{
            "deviceStats": [
                {
                    "tempDataBytes": 100,
                    "tempDataBytesForwarded": 25,
                    "loadDataBytes": 50,
                    "loadDataBytesForwarded": 10,
                    "fuelDataBytes": 40,
                    "fuelDataBytesForwarded": 40,
                    "startTime": "2021-05-01T10:00:00",
                    "endTime": "2021-05-01T11:00:00",
                    "requests": 12
                }
            ],
            "temperatureData": [
                { "time": "2021-05-01T10:00:00", "value": 78.5, "unit": "CELSIUS" }
            ],
            "loadData": [
                { "time": "2021-05-01T10:00:00", "value": 250.0, "unit": "KILOGRAM" },
                { "time": "2021-05-01T10:00:10", "value": 300.0, "unit": "KILOGRAM" }
            ],
            "fuelData": []
        }"#;

        let bulk: BulkResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(bulk.device_stats.len(), 1);
        assert_eq!(bulk.device_stats[0].temp_data_bytes, 100);
        assert_eq!(bulk.device_stats[0].fuel_data_bytes_forwarded, 40);
        assert_eq!(bulk.temperature_data.len(), 1);
        assert_eq!(bulk.temperature_data[0].value, 78.5);
        assert_eq!(bulk.load_data.len(), 2);
        assert!(bulk.fuel_data.is_empty());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let bulk: BulkResponse = serde_json::from_str("{}").unwrap();
        assert!(bulk.device_stats.is_empty());
        assert!(bulk.temperature_data.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpTelemetryApi::new("http://localhost:8080/");
        assert_eq!(api.base_url, "http://localhost:8080");
    }
}
