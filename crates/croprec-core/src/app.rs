use croprec_scoring::{CropScore, RecommendRequest, ScoringEngine};
use croprec_weather::{WeatherClient, WeatherMode};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{AppError, ConfigError};
use crate::Config;

/// Recommendation service: weather acquisition feeding the scoring engine.
///
/// One instance is shared by every request so they all see the same cache
/// and rate limiter.
#[derive(Debug)]
pub struct App {
    config: Arc<Config>,
    weather: WeatherClient,
    engine: ScoringEngine,
}

impl App {
    /// Build the service from a validated config.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        let weather = WeatherClient::open_weather(
            config.client_settings(),
            config.weather.api_key.as_deref(),
            &config.weather.base_url,
            config.request_timeout(),
        )?;

        Ok(Self::with_parts(config, weather, ScoringEngine::new()))
    }

    /// Assemble from pre-built parts (custom provider, clock or catalog).
    pub fn with_parts(config: Config, weather: WeatherClient, engine: ScoringEngine) -> Self {
        tracing::info!(
            "Recommendation service ready (mode: {}, weather signal: {})",
            config.weather.mode,
            if weather.is_degraded() { "off" } else { "on" }
        );
        Self {
            config: Arc::new(config),
            weather,
            engine,
        }
    }

    /// Rank crops for `request` using the configured weather mode.
    pub async fn recommend(&self, request: &RecommendRequest) -> Result<Vec<CropScore>, AppError> {
        self.recommend_with_mode(request, self.config.weather.mode)
            .await
    }

    #[instrument(skip(self, request), fields(lat = request.lat, lon = request.lon), level = "info")]
    pub async fn recommend_with_mode(
        &self,
        request: &RecommendRequest,
        mode: WeatherMode,
    ) -> Result<Vec<CropScore>, AppError> {
        let weather = self.weather.fetch(request.lat, request.lon, mode).await?;
        let scores = self.engine.score(request, &weather);

        if let Some(best) = scores.first() {
            tracing::info!("Top recommendation: {} ({:.1})", best.crop, best.score);
        }
        Ok(scores)
    }

    pub fn weather(&self) -> &WeatherClient {
        &self.weather
    }
}
