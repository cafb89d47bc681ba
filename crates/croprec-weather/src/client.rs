//! Caching, rate-limited, retrying front for a [`WeatherProvider`].

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::aggregate::{aggregate_payload, DEFAULT_HORIZON_HOURS};
use crate::cache::{WeatherCache, DEFAULT_CACHE_TTL};
use crate::clock::{Clock, SystemClock};
use crate::coordinate::CoordinateKey;
use crate::error::WeatherError;
use crate::provider::{OpenWeatherProvider, WeatherProvider};
use crate::rate_limit::{RateLimiter, DEFAULT_MIN_INTERVAL};
use crate::retry::{with_backoff, RetryPolicy};
use crate::types::{CurrentSummary, WeatherMode, WeatherSummary};

/// Tunables for [`WeatherClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub cache_ttl: Duration,
    pub min_interval: Duration,
    pub forecast_horizon_hours: u32,
    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            min_interval: DEFAULT_MIN_INTERVAL,
            forecast_horizon_hours: DEFAULT_HORIZON_HOURS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Weather acquisition service shared by all in-flight requests.
///
/// Without a provider (no credential configured) every fetch returns
/// [`WeatherSummary::NoSignal`] without touching the cache, the limiter or
/// the network.
#[derive(Debug)]
pub struct WeatherClient {
    provider: Option<Arc<dyn WeatherProvider>>,
    cache: WeatherCache,
    limiter: RateLimiter,
    retry: RetryPolicy,
    horizon_hours: u32,
    clock: Arc<dyn Clock>,
}

impl WeatherClient {
    pub fn new(
        settings: ClientSettings,
        provider: Option<Arc<dyn WeatherProvider>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache: WeatherCache::new(settings.cache_ttl, clock.clone()),
            limiter: RateLimiter::new(settings.min_interval, clock.clone()),
            retry: settings.retry,
            horizon_hours: settings.forecast_horizon_hours,
            clock,
        }
    }

    /// Client backed by OpenWeather when `api_key` is set, degraded otherwise.
    pub fn open_weather(
        settings: ClientSettings,
        api_key: Option<&str>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let provider: Option<Arc<dyn WeatherProvider>> = match api_key {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(
                OpenWeatherProvider::with_base_url(key.trim(), base_url, timeout)?,
            )),
            _ => {
                tracing::debug!("No weather API key, provider disabled");
                None
            }
        };
        Ok(Self::new(settings, provider, Arc::new(SystemClock)))
    }

    pub fn is_degraded(&self) -> bool {
        self.provider.is_none()
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Raw provider document for the bucket containing (`lat`, `lon`).
    ///
    /// Returns `Ok(None)` in degraded mode.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_raw(
        &self,
        lat: f64,
        lon: f64,
        mode: WeatherMode,
    ) -> Result<Option<Value>, WeatherError> {
        let Some(provider) = self.provider.as_deref() else {
            return Ok(None);
        };

        let key = CoordinateKey::bucket(lat, lon, mode);
        if let Some(payload) = self.cache.get(&key) {
            return Ok(Some(payload));
        }

        self.limiter.acquire().await;

        let result = with_backoff(&self.retry, self.clock.as_ref(), move |_| {
            provider.fetch(lat, lon, mode)
        })
        .await;

        match result {
            Ok(payload) => {
                self.cache.put(key, payload.clone());
                tracing::info!("Cached {} weather for {}", mode, key);
                Ok(Some(payload))
            }
            Err(e) => {
                if let Some(stale) = self.cache.get_stale(&key) {
                    tracing::warn!("Serving stale weather for {} after provider failure: {}", key, e);
                    return Ok(Some(stale));
                }
                Err(WeatherError::ProviderUnavailable {
                    attempts: self.retry.max_attempts.max(1),
                    source: e,
                })
            }
        }
    }

    /// Weather summary for scoring.
    pub async fn fetch(
        &self,
        lat: f64,
        lon: f64,
        mode: WeatherMode,
    ) -> Result<WeatherSummary, WeatherError> {
        let summary = match self.fetch_raw(lat, lon, mode).await? {
            Some(payload) => self.summarize(&payload, mode),
            None => WeatherSummary::no_signal(mode),
        };
        tracing::debug!("Weather summary for {:.4},{:.4}: {:?}", lat, lon, summary);
        Ok(summary)
    }

    /// Reduce a raw provider document to the summary for `mode`.
    pub fn summarize(&self, payload: &Value, mode: WeatherMode) -> WeatherSummary {
        match mode {
            WeatherMode::Current => WeatherSummary::Current(CurrentSummary::from_payload(payload)),
            WeatherMode::Forecast => {
                WeatherSummary::Forecast(aggregate_payload(payload, self.horizon_hours))
            }
        }
    }
}
