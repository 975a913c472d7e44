//! Concurrent per-article summary enrichment.

use futures::future::join_all;
use newspulse_core::Article;

use crate::client::Summarizer;

/// Sentinel attached when a summarization call fails.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

const MAX_SUMMARY_INPUT_CHARS: usize = 2000;

/// Build the summarization input for an article: title plus description,
/// truncated to a bounded number of characters.
#[must_use]
pub fn summary_input(title: &str, description: Option<&str>) -> String {
    let mut text = match description {
        Some(description) => format!("{title} {description}"),
        None => title.to_string(),
    };
    if let Some((boundary, _)) = text.char_indices().nth(MAX_SUMMARY_INPUT_CHARS) {
        text.truncate(boundary);
    }
    text
}

/// Attach an `llm_summary` to every article, one summarization call per
/// article issued concurrently.
///
/// Each call has its own failure domain: a failed call yields the sentinel
/// text for that article only, never fails the batch, and never blocks
/// sibling calls. Summaries rejoin by input position, so the article order
/// is preserved regardless of completion order. No retry.
pub async fn enrich_articles(summarizer: &dyn Summarizer, articles: &mut [Article]) {
    let inputs: Vec<String> = articles
        .iter()
        .map(|article| summary_input(&article.title, article.description.as_deref()))
        .collect();

    let summaries = join_all(inputs.iter().map(|text| async move {
        match summarizer.summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "summary generation failed");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }))
    .await;

    for (article, summary) in articles.iter_mut().zip(summaries) {
        article.llm_summary = Some(summary);
    }
}
