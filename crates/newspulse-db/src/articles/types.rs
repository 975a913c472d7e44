use chrono::{DateTime, Utc};
use newspulse_core::Article;
use uuid::Uuid;

/// Article row as projected by the read queries.
///
/// Latitude/longitude are decoded from the `location` geography column via
/// `ST_Y`/`ST_X` in the projection, so the row carries plain doubles.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub source_name: Option<String>,
    pub categories: Vec<String>,
    pub relevance_score: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            description: row.description,
            url: row.url,
            publication_date: row.publication_date,
            source_name: row.source_name,
            categories: row.categories,
            relevance_score: row.relevance_score,
            latitude: row.latitude,
            longitude: row.longitude,
            llm_summary: None,
        }
    }
}
