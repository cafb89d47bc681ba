use anyhow::{Context, Result};
use croprec_weather::{ClientSettings, RetryPolicy, WeatherMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_CACHE_TTL: &str = "CACHE_TTL_SECONDS";
pub const ENV_MIN_INTERVAL: &str = "OWM_MIN_INTERVAL_SECONDS";
pub const ENV_HORIZON: &str = "FORECAST_HORIZON_HOURS";
pub const ENV_MODE: &str = "WEATHER_MODE";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider and cache settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Provider retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeather API key. Without one, recommendations use soil only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider root URL
    pub base_url: String,

    /// How long a fetched payload may be reused
    pub cache_ttl_secs: u64,

    /// Minimum spacing between outbound provider calls
    pub min_interval_secs: f64,

    /// Hours of forecast folded into one summary
    pub forecast_horizon_hours: u32,

    /// Per-call HTTP timeout
    pub request_timeout_secs: u64,

    /// Default weather mode for recommendations
    pub mode: WeatherMode,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: croprec_weather::provider::OPENWEATHER_BASE_URL.to_string(),
            cache_ttl_secs: 600,
            min_interval_secs: 1.2,
            forecast_horizon_hours: 72,
            request_timeout_secs: 8,
            mode: WeatherMode::Current,
        }
    }
}

impl WeatherConfig {
    /// Check if a usable API key is present
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_secs: f64,
    pub multiplier: f64,
    pub rate_limit_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.8,
            multiplier: 1.6,
            rate_limit_delay_secs: 2.0,
            max_delay_secs: 30.0,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: secs_or(self.base_delay_secs, defaults.base_delay),
            multiplier: self.multiplier,
            rate_limit_delay: secs_or(self.rate_limit_delay_secs, defaults.rate_limit_delay),
            max_delay: secs_or(self.max_delay_secs, defaults.max_delay),
        }
    }
}

fn secs_or(secs: f64, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(fallback)
}

impl Config {
    /// Load configuration from the user config directory, creating a
    /// default file if none exists, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Could not write default config: {:#}", e);
            }
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a TOML config file without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Unparseable values are ignored with a
    /// warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.weather.api_key = Some(key);
        }
        if let Some(v) = parse_override(&lookup, ENV_CACHE_TTL) {
            self.weather.cache_ttl_secs = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_MIN_INTERVAL) {
            self.weather.min_interval_secs = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_HORIZON) {
            self.weather.forecast_horizon_hours = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_MODE) {
            self.weather.mode = v;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if !self.weather.has_api_key() {
            result.add_warning(
                "weather.api_key",
                "No API key configured - recommendations will use soil data only",
            );
        }

        if self.weather.cache_ttl_secs == 0 {
            result.add_warning("weather.cache_ttl_secs", "Caching disabled (0 seconds)");
        }

        if !(self.weather.min_interval_secs >= 0.0 && self.weather.min_interval_secs.is_finite()) {
            result.add_error(
                "weather.min_interval_secs",
                "Minimum call interval must be a non-negative number",
            );
        }

        if self.weather.forecast_horizon_hours == 0 {
            result.add_error(
                "weather.forecast_horizon_hours",
                "Forecast horizon must be at least 1 hour",
            );
        } else if self.weather.forecast_horizon_hours > 120 {
            result.add_warning(
                "weather.forecast_horizon_hours",
                "Forecast horizon exceeds the 5-day forecast; all steps will be used",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error("weather.request_timeout_secs", "Timeout must be greater than 0");
        }

        if self.retry.max_attempts == 0 {
            result.add_error("retry.max_attempts", "At least one attempt is required");
        }

        if !(self.retry.multiplier > 0.0 && self.retry.multiplier.is_finite()) {
            result.add_error("retry.multiplier", "Backoff multiplier must be positive");
        }

        for (field, value) in [
            ("retry.base_delay_secs", self.retry.base_delay_secs),
            ("retry.rate_limit_delay_secs", self.retry.rate_limit_delay_secs),
            ("retry.max_delay_secs", self.retry.max_delay_secs),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                result.add_error(field, "Delay must be a non-negative number");
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Settings for the weather client derived from this config
    pub fn client_settings(&self) -> ClientSettings {
        let defaults = ClientSettings::default();
        ClientSettings {
            cache_ttl: Duration::from_secs(self.weather.cache_ttl_secs),
            min_interval: secs_or(self.weather.min_interval_secs, defaults.min_interval),
            forecast_horizon_hours: self.weather.forecast_horizon_hours,
            retry: self.retry.to_policy(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.request_timeout_secs)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("croprec");

        Ok(config_dir.join("config.toml"))
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}
