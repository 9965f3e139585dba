use crate::config::EtlConfig;
use crate::errors::{Error, Result};
use crate::model::RawWeatherResponse;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

pub const FORECAST_PATH: &str = "/v1/forecast";

/// Extract stage: where current weather comes from.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current(&self, config: &EtlConfig) -> Result<RawWeatherResponse>;
}

/// Open-Meteo forecast API client.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    http: Client,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, FORECAST_PATH)
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_current(&self, config: &EtlConfig) -> Result<RawWeatherResponse> {
        let url = self.endpoint();
        info!(
            "Fetching current weather for ({}, {}) from {}",
            config.latitude, config.longitude, url
        );

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", config.latitude.to_string()),
                ("longitude", config.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            warn!("Weather API responded with status {}", status);
            return Err(Error::Fetch {
                status: status.as_u16(),
            });
        }

        let body = res.bytes().await?;
        debug!("Received {} bytes from weather API", body.len());

        let value: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(RawWeatherResponse(value))
    }
}
