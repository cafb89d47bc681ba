//! Weather acquisition for crop recommendations.
//!
//! Fetches current conditions or forecasts from OpenWeather behind a
//! coordinate-bucketed TTL cache, a process-wide courtesy rate limiter and a
//! retry-with-backoff policy, and reduces the payloads into summaries the
//! scoring engine consumes.

pub mod aggregate;
pub mod cache;
pub mod client;
pub mod clock;
pub mod coordinate;
pub mod error;
pub mod provider;
pub mod rate_limit;
pub mod retry;
pub mod types;

pub use aggregate::{aggregate, aggregate_payload};
pub use cache::WeatherCache;
pub use client::{ClientSettings, WeatherClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinate::CoordinateKey;
pub use error::{ProviderError, WeatherError};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use rate_limit::RateLimiter;
pub use retry::{with_backoff, RetryKind, RetryPolicy};
pub use types::*;
