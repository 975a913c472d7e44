//! Article domain type shared between the store, services and API layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A news article as returned to callers.
///
/// `llm_summary` is an enrichment attached after the store read; it is never
/// written back to the article row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
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
    pub llm_summary: Option<String>,
}
