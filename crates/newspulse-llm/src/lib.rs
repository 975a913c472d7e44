//! Summarization and query-intent extraction over the Gemini REST API,
//! plus the concurrent per-article summary enricher.

mod client;
mod enrich;
mod error;
mod types;

pub use client::{GeminiClient, Summarizer, DEFAULT_BASE_URL};
pub use enrich::{enrich_articles, summary_input, SUMMARY_UNAVAILABLE};
pub use error::LlmError;
pub use types::QueryIntent;
