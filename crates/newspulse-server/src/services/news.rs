use std::sync::Arc;

use newspulse_core::Article;
use newspulse_db::{count_articles, find_articles, ArticleFilter, DbError, Page};
use newspulse_llm::{enrich_articles, QueryIntent, Summarizer};
use sqlx::PgPool;

/// One page of articles plus the total match count for the same filter.
#[derive(Debug, Clone)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total: i64,
}

/// Filtered article retrieval with summary enrichment.
pub struct NewsService {
    pool: PgPool,
    summarizer: Arc<dyn Summarizer>,
}

impl NewsService {
    #[must_use]
    pub fn new(pool: PgPool, summarizer: Arc<dyn Summarizer>) -> Self {
        Self { pool, summarizer }
    }

    /// Fetch one page of articles matching `filter`, with summaries attached
    /// and the total count of matching rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidFilter`] for a malformed filter and
    /// [`DbError`] for store failures. Enrichment failures degrade to
    /// sentinel summaries and never fail the request.
    pub async fn fetch(&self, filter: &ArticleFilter, page: Page) -> Result<NewsPage, DbError> {
        let mut articles = find_articles(&self.pool, filter, page).await?;
        let total = count_articles(&self.pool, filter).await?;

        if !articles.is_empty() {
            enrich_articles(self.summarizer.as_ref(), &mut articles).await;
        }

        Ok(NewsPage { articles, total })
    }

    /// Free-text search: interpret the query through the summarizer's intent
    /// extraction, then run a full-text fetch over the derived terms.
    ///
    /// Extraction failures degrade to whitespace-split terms from the raw
    /// query; they never fail the request.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] for store failures.
    pub async fn search(
        &self,
        query: &str,
        category: Option<String>,
        min_score: Option<f64>,
        page: Page,
    ) -> Result<NewsPage, DbError> {
        let intent = match self.summarizer.extract_intent(query).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(error = %e, "intent extraction failed, using raw query terms");
                QueryIntent::fallback(query)
            }
        };

        let search_text = if intent.search_terms.is_empty() {
            query.to_string()
        } else {
            intent.search_terms.join(" ")
        };
        tracing::debug!(query, derived = %search_text, "search terms derived");

        let filter = ArticleFilter {
            category,
            min_score,
            search_text: Some(search_text),
            ..ArticleFilter::default()
        };
        self.fetch(&filter, page).await
    }

    /// Geospatial fetch: articles within `radius_km` of a point, closest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidFilter`] for a non-positive radius and
    /// [`DbError`] for store failures.
    pub async fn nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        category: Option<String>,
        page: Page,
    ) -> Result<NewsPage, DbError> {
        let filter = ArticleFilter {
            category,
            lat: Some(lat),
            lon: Some(lon),
            radius_km: Some(radius_km),
            ..ArticleFilter::default()
        };
        self.fetch(&filter, page).await
    }
}
