use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use newspulse_cache::{GeoCache, TRENDING_TTL_SECS};
use newspulse_core::{Article, GeoPoint};
use newspulse_db::{fetch_events_window, get_articles_by_ids, DbError, SpatialBound};
use newspulse_llm::{enrich_articles, Summarizer};
use newspulse_trending::{aggregate_events, rank, ENGAGEMENT_WINDOW_HOURS};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Default radius for the trending event scan when the caller gives none.
pub const DEFAULT_TRENDING_RADIUS_KM: f64 = 50.0;

#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("no engagement events in the window for this location")]
    NoData,
    #[error(transparent)]
    Store(#[from] DbError),
}

/// The trending pipeline: cached scan → aggregate → rank → join → enrich.
pub struct TrendingService {
    pool: PgPool,
    cache: GeoCache,
    summarizer: Arc<dyn Summarizer>,
}

impl TrendingService {
    #[must_use]
    pub fn new(pool: PgPool, cache: GeoCache, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            pool,
            cache,
            summarizer,
        }
    }

    /// Ranked trending articles near a point.
    ///
    /// Served from the geohash-bucketed cache when possible; a cache fault of
    /// any kind falls back to direct computation. "No data" is an error, not
    /// an empty page, and is never written to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`TrendingError::NoData`] when no qualifying events exist and
    /// [`TrendingError::Store`] on store failure.
    pub async fn trending_near(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Article>, TrendingError> {
        let limit_key = i64::try_from(limit).unwrap_or(i64::MAX);
        let articles = match GeoCache::trending_key(lat, lon, limit_key) {
            Ok(key) => {
                self.cache
                    .get_or_compute(&key, TRENDING_TTL_SECS, || {
                        self.compute(lat, lon, radius_km, limit)
                    })
                    .await?
            }
            Err(e) => {
                tracing::warn!(error = %e, "trending cache key unavailable, computing directly");
                self.compute(lat, lon, radius_km, limit).await?
            }
        };

        if articles.is_empty() {
            return Err(TrendingError::NoData);
        }
        Ok(articles)
    }

    /// Generate synthetic engagement events attributed to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the seeding insert fails.
    pub async fn simulate_events(&self, user_id: Uuid, num_events: usize) -> Result<usize, DbError> {
        let inserted = newspulse_db::generate_events(&self.pool, user_id, num_events).await?;
        tracing::info!(inserted, "generated synthetic engagement events");
        Ok(inserted)
    }

    async fn compute(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Article>, TrendingError> {
        let center = GeoPoint { lat, lon };
        let bound = SpatialBound { center, radius_km };

        let events = fetch_events_window(&self.pool, ENGAGEMENT_WINDOW_HOURS, Some(bound)).await?;
        let stats = aggregate_events(&events, Some(center));
        if stats.is_empty() {
            return Err(TrendingError::NoData);
        }

        let ranked = rank(&stats, Utc::now(), limit);
        let ids: Vec<Uuid> = ranked.iter().map(|entry| entry.article_id).collect();

        let mut by_id: HashMap<Uuid, Article> = get_articles_by_ids(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|article| (article.id, article))
            .collect();

        // Articles deleted since their events were recorded drop out here.
        let mut articles: Vec<Article> = ranked
            .iter()
            .filter_map(|entry| by_id.remove(&entry.article_id))
            .collect();
        if articles.is_empty() {
            return Err(TrendingError::NoData);
        }

        enrich_articles(self.summarizer.as_ref(), &mut articles).await;
        Ok(articles)
    }
}
