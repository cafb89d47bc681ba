//! Weather provider boundary and the OpenWeather HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{ProviderError, WeatherError};
use crate::types::WeatherMode;

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

const CURRENT_PATH: &str = "data/2.5/weather";
const FORECAST_PATH: &str = "data/2.5/forecast";

/// Remote source of raw weather documents.
///
/// One call is one attempt; retrying, throttling and caching belong to
/// [`crate::WeatherClient`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, lat: f64, lon: f64, mode: WeatherMode) -> Result<Value, ProviderError>;
}

/// OpenWeather "current weather" and "5 day / 3 hour forecast" endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    client: Arc<Client>,
    base_url: Url,
    api_key: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, OPENWEATHER_BASE_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Point the provider at another host (a proxy or a mock server).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WeatherError::Client(format!("invalid base URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Client(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, mode: WeatherMode) -> Result<Url, ProviderError> {
        let path = match mode {
            WeatherMode::Current => CURRENT_PATH,
            WeatherMode::Forecast => FORECAST_PATH,
        };
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Parse(format!("bad endpoint URL: {}", e)))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, lat: f64, lon: f64, mode: WeatherMode) -> Result<Value, ProviderError> {
        let url = self.endpoint(mode)?;
        tracing::info!("Requesting {} weather for {:.4},{:.4}", mode, lat, lon);

        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}
