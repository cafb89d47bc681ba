//! In-memory TTL cache for provider payloads.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::coordinate::CoordinateKey;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    payload: Value,
}

/// Transient cache keyed by coordinate bucket.
///
/// Expired entries are never returned by [`WeatherCache::get`], but stay in
/// the map until the next `put` for the same key so that
/// [`WeatherCache::get_stale`] can serve them when the provider is down.
/// There is no size bound; the map grows with the number of distinct
/// buckets queried during the process lifetime.
#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<CoordinateKey, CacheEntry>>,
}

impl WeatherCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Payload for `key` if it is no older than the TTL.
    pub fn get(&self, key: &CoordinateKey) -> Option<Value> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        let age = now.saturating_duration_since(entry.stored_at);
        if age <= self.ttl {
            tracing::debug!("Cache hit for {} (age {:?})", key, age);
            Some(entry.payload.clone())
        } else {
            tracing::debug!("Cache entry for {} expired (age {:?})", key, age);
            None
        }
    }

    /// Payload for `key` regardless of age.
    pub fn get_stale(&self, key: &CoordinateKey) -> Option<Value> {
        self.entries.lock().get(key).map(|e| e.payload.clone())
    }

    pub fn put(&self, key: CoordinateKey, payload: Value) {
        let entry = CacheEntry {
            stored_at: self.clock.now(),
            payload,
        };
        self.entries.lock().insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::WeatherMode;
    use serde_json::json;

    fn cache_with_clock(ttl_secs: u64) -> (WeatherCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = WeatherCache::new(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_put_then_get_returns_payload() {
        let (cache, _clock) = cache_with_clock(600);
        let key = CoordinateKey::bucket(12.97, 77.59, WeatherMode::Current);
        let payload = json!({"main": {"temp": 24.0}});

        cache.put(key, payload.clone());
        assert_eq!(cache.get(&key), Some(payload));
    }

    #[test]
    fn test_get_at_ttl_boundary_is_hit() {
        let (cache, clock) = cache_with_clock(600);
        let key = CoordinateKey::bucket(1.0, 1.0, WeatherMode::Current);
        cache.put(key, json!({}));

        clock.advance(Duration::from_secs(600));
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_get_after_ttl_is_miss_but_stale_kept() {
        let (cache, clock) = cache_with_clock(600);
        let key = CoordinateKey::bucket(1.0, 1.0, WeatherMode::Current);
        cache.put(key, json!({"v": 1}));

        clock.advance(Duration::from_secs(601));
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.get_stale(&key), Some(json!({"v": 1})));
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let (cache, clock) = cache_with_clock(10);
        let key = CoordinateKey::bucket(5.0, 5.0, WeatherMode::Forecast);
        cache.put(key, json!({"v": 1}));
        clock.advance(Duration::from_secs(30));

        cache.put(key, json!({"v": 2}));
        assert_eq!(cache.get(&key), Some(json!({"v": 2})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unknown_key_is_miss() {
        let (cache, _clock) = cache_with_clock(600);
        let key = CoordinateKey::bucket(0.0, 0.0, WeatherMode::Current);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.get_stale(&key), None);
    }
}
