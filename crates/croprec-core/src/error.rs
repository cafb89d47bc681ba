//! Centralized error types for the recommendation service.
//!
//! Weather failures reach callers as a single service-level error: the
//! provider was unavailable and no recommendation could be made. A missing
//! weather signal is not an error and never shows up here.

use croprec_weather::WeatherError;
use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a caller-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Weather(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
        }
    }

    /// Whether the failure came from the upstream weather provider
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::Weather(WeatherError::ProviderUnavailable { .. })
        )
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}
