//! Cache capability: key-value store trait, redis implementation, and the
//! geohash-bucketed read-through layer for trending results.

mod geo;
mod store;

pub use geo::{GeoCache, GEOHASH_PRECISION, TRENDING_TTL_SECS};
pub use store::{CacheError, CacheStore, DisabledCache, RedisCache};
