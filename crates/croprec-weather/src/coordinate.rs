//! Coordinate bucketing for cache keys.

use crate::types::WeatherMode;

/// Decimal places kept when bucketing. Two decimals is roughly 1.1 km.
const BUCKET_PRECISION: f64 = 100.0;

/// Cache key for a rounded (lat, lon) pair and endpoint.
///
/// Buckets are stored as integer hundredths so the key hashes and compares
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    pub mode: WeatherMode,
    lat_bucket: i64,
    lon_bucket: i64,
}

impl CoordinateKey {
    pub fn bucket(lat: f64, lon: f64, mode: WeatherMode) -> Self {
        Self {
            mode,
            lat_bucket: round_half_up(lat),
            lon_bucket: round_half_up(lon),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat_bucket as f64 / BUCKET_PRECISION
    }

    pub fn lon(&self) -> f64 {
        self.lon_bucket as f64 / BUCKET_PRECISION
    }
}

impl std::fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{:.2},{:.2}", self.mode, self.lat(), self.lon())
    }
}

fn round_half_up(x: f64) -> i64 {
    (x * BUCKET_PRECISION + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_rounds_to_two_decimals() {
        let key = CoordinateKey::bucket(12.3449, 77.5951, WeatherMode::Current);
        assert_eq!(key.lat(), 12.34);
        assert_eq!(key.lon(), 77.6);
    }

    #[test]
    fn test_bucket_half_rounds_up() {
        // 0.125 is exact in binary, so x * 100 + 0.5 lands on 13.0
        let key = CoordinateKey::bucket(0.125, -0.125, WeatherMode::Current);
        assert_eq!(key.lat(), 0.13);
        assert_eq!(key.lon(), -0.12);
    }

    #[test]
    fn test_nearby_points_share_bucket() {
        let base = CoordinateKey::bucket(28.6139, 77.2090, WeatherMode::Current);
        for eps in [0.001, -0.001, 0.0009, -0.0034] {
            let other = CoordinateKey::bucket(28.6139 + eps, 77.2090 + eps, WeatherMode::Current);
            assert_eq!(base, other, "eps {} moved the bucket", eps);
        }
    }

    #[test]
    fn test_bucket_is_idempotent() {
        let key = CoordinateKey::bucket(-33.8688, 151.2093, WeatherMode::Forecast);
        let again = CoordinateKey::bucket(key.lat(), key.lon(), WeatherMode::Forecast);
        assert_eq!(key, again);
    }

    #[test]
    fn test_mode_separates_keys() {
        let current = CoordinateKey::bucket(10.0, 20.0, WeatherMode::Current);
        let forecast = CoordinateKey::bucket(10.0, 20.0, WeatherMode::Forecast);
        assert_ne!(current, forecast);
    }

    #[test]
    fn test_display() {
        let key = CoordinateKey::bucket(1.0, -2.5, WeatherMode::Forecast);
        assert_eq!(key.to_string(), "forecast@1.00,-2.50");
    }
}
