//! Weather acquisition error types.

use thiserror::Error;

use crate::retry::{RetryClassify, RetryKind};

/// Failure of a single provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited by weather provider (429)")]
    RateLimited,

    #[error("Weather provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid provider response: {0}")]
    Parse(String),
}

impl RetryClassify for ProviderError {
    fn retry_kind(&self) -> RetryKind {
        match self {
            Self::RateLimited => RetryKind::RateLimited,
            _ => RetryKind::Backoff,
        }
    }
}

/// Error surfaced by [`crate::WeatherClient`].
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Retries exhausted with nothing cached to fall back on. Only the
    /// last underlying failure is kept.
    #[error("Weather provider unavailable after {attempts} attempts: {source}")]
    ProviderUnavailable {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    #[error("Weather client setup failed: {0}")]
    Client(String),
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable { .. } => {
                "Weather service unavailable. Please try again later."
            }
            Self::Client(_) => "Weather service is misconfigured. Check settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_classified_separately() {
        assert_eq!(ProviderError::RateLimited.retry_kind(), RetryKind::RateLimited);
        let err = ProviderError::Status {
            status: 503,
            body: "busy".into(),
        };
        assert_eq!(err.retry_kind(), RetryKind::Backoff);
        assert_eq!(ProviderError::Parse("bad".into()).retry_kind(), RetryKind::Backoff);
    }

    #[test]
    fn test_unavailable_keeps_last_cause() {
        let err = WeatherError::ProviderUnavailable {
            attempts: 3,
            source: ProviderError::Status {
                status: 401,
                body: "Invalid API key".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("401"));
        assert!(err.user_message().contains("unavailable"));
    }
}
