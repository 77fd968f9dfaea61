//! Optional geolocation for map-grounded requests.
//!
//! Location is best effort: an unavailable or slow provider degrades to a
//! request without a location hint, never to an error.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::LocationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Source of the device position. `None` covers denied permission and
/// unsupported platforms alike.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Option<LatLng>;
}

/// Provider that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub LatLng);

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn current_position(&self) -> Option<LatLng> {
        Some(self.0)
    }
}

/// Last known position, owned by the caller.
#[derive(Debug)]
pub struct LocationCache {
    ttl: Duration,
    last: Mutex<Option<(LatLng, Instant)>>,
}

impl LocationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            last: Mutex::new(None),
        }
    }

    /// Cached position if it is younger than the TTL.
    pub fn get(&self) -> Option<LatLng> {
        let guard = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match *guard {
            Some((position, stored_at)) if stored_at.elapsed() < self.ttl => Some(position),
            _ => None,
        }
    }

    pub fn store(&self, position: LatLng) {
        let mut guard = self.last.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some((position, Instant::now()));
    }

    pub fn clear(&self) {
        let mut guard = self.last.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

/// Provider + cache + timeout.
pub struct LocationResolver {
    provider: Arc<dyn GeolocationProvider>,
    cache: Arc<LocationCache>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(provider: Arc<dyn GeolocationProvider>, cache: Arc<LocationCache>, timeout: Duration) -> Self {
        Self {
            provider,
            cache,
            timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn GeolocationProvider>, config: &LocationConfig) -> Self {
        Self::new(
            provider,
            Arc::new(LocationCache::new(Duration::from_secs(config.cache_ttl_secs))),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn cache(&self) -> &Arc<LocationCache> {
        &self.cache
    }

    /// Fresh cached position, else one provider query bounded by the timeout.
    pub async fn resolve(&self) -> Option<LatLng> {
        if let Some(position) = self.cache.get() {
            tracing::debug!("Using cached location");
            return Some(position);
        }

        match tokio::time::timeout(self.timeout, self.provider.current_position()).await {
            Ok(Some(position)) if position.is_valid() => {
                self.cache.store(position);
                Some(position)
            }
            Ok(Some(position)) => {
                tracing::warn!(?position, "Geolocation provider returned an invalid position");
                None
            }
            Ok(None) => {
                tracing::debug!("Geolocation unavailable, continuing without location");
                None
            }
            Err(_) => {
                tracing::debug!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Geolocation timed out, continuing without location"
                );
                None
            }
        }
    }
}
