//! Geohash-bucketed read-through cache for trending results.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::{CacheError, CacheStore};

/// Geohash precision for the trending cache key. A precision-5 cell is
/// roughly 4.9 km × 4.9 km, deliberately coarse so nearby callers collapse
/// onto the same entry regardless of exact coordinates.
pub const GEOHASH_PRECISION: usize = 5;

/// Trending cache entry lifetime. Entries expire only by TTL; there is no
/// explicit invalidation path.
pub const TRENDING_TTL_SECS: u64 = 300;

/// Cache-aside layer over a [`CacheStore`].
///
/// Read failures and corrupt entries are logged and treated as misses;
/// write failures are logged and swallowed. Concurrent misses for the same
/// key may each run `compute` independently; recomputation is idempotent
/// and the TTL is short, so no single-flight coalescing is applied.
#[derive(Clone)]
pub struct GeoCache {
    store: Arc<dyn CacheStore>,
}

impl GeoCache {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Derive the trending cache key for a location and page size.
    ///
    /// Key shape: `trending:{geohash5}:limit{limit}`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Key`] for coordinates outside the valid
    /// latitude/longitude ranges.
    pub fn trending_key(lat: f64, lon: f64, limit: i64) -> Result<String, CacheError> {
        let cell = geohash::encode(geohash::Coord { x: lon, y: lat }, GEOHASH_PRECISION)
            .map_err(|e| CacheError::Key(e.to_string()))?;
        Ok(format!("trending:{cell}:limit{limit}"))
    }

    /// Cache-aside read: return the cached value if present and
    /// deserializable, otherwise run `compute`, best-effort write the result
    /// back with `ttl_secs`, and return it.
    ///
    /// # Errors
    ///
    /// Only `compute`'s own error is propagated; cache faults never are.
    /// A failed `compute` leaves the cache untouched.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl_secs: u64,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    tracing::debug!(key, "cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "cache entry corrupt, recomputing");
                }
            },
            Ok(None) => tracing::debug!(key, "cache miss"),
            Err(e) => tracing::warn!(key, error = %e, "cache read failed, treating as miss"),
        }

        let value = compute().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = self.store.set(key, &raw, ttl_secs).await {
                    tracing::warn!(key, error = %e, "cache write failed");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "cache value serialization failed"),
        }

        Ok(value)
    }
}
