//! HTTP client for the Gemini `generateContent` REST API.
//!
//! Wraps `reqwest` with typed error handling and response extraction. The
//! base URL is overridable so tests can point at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::LlmError;
use crate::types::{GenerateRequest, GenerateResponse, QueryIntent};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Summarization and intent-extraction capability.
///
/// Both calls are fallible and carry no latency bound; callers own the
/// degradation policy (sentinel summaries, fallback search terms).
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, LlmError>;
    async fn extract_intent(&self, query: &str) -> Result<QueryIntent, LlmError>;
}

/// Client for the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a client pointed at the production Gemini endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the client cannot be constructed, or
    /// [`LlmError::Api`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("newspulse/0.1 (news-enrichment)")
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| LlmError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Send one prompt and return the first candidate's text.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Api`] on a non-success HTTP status.
    /// - [`LlmError::Http`] on network failure.
    /// - [`LlmError::EmptyCompletion`] when the model returned no text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        // The model segment contains a ':' action suffix, so the path is set
        // directly rather than joined (Url::join would read it as a scheme).
        let mut url = self.base_url.clone();
        url.set_path(&format!("v1beta/models/{}:generateContent", self.model));

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(LlmError::Api(format!("HTTP {status}: {snippet}")));
        }

        let body: GenerateResponse = response.json().await?;
        body.first_text().ok_or(LlmError::EmptyCompletion)
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        let prompt =
            format!("Summarize this news article in 2-3 concise sentences:\n\n{text}\n\nSummary:");
        self.generate(&prompt).await
    }

    async fn extract_intent(&self, query: &str) -> Result<QueryIntent, LlmError> {
        let prompt = format!(
            "Extract information from this news query and return ONLY valid JSON \
             without any markdown formatting:\n\n\
             Query: \"{query}\"\n\n\
             Return a JSON object with these fields:\n\
             - entities: list of named entities (people, organizations, locations, events)\n\
             - intent: one of [\"category\", \"score\", \"search\", \"source\", \"nearby\"]\n\
             - search_terms: list of keywords for searching\n\
             - location_hint: any location mentioned (or null)\n\n\
             Example output:\n\
             {{\"entities\": [\"Elon Musk\", \"Twitter\"], \"intent\": \"search\", \
             \"search_terms\": [\"Elon Musk\", \"Twitter\", \"acquisition\"], \
             \"location_hint\": \"Palo Alto\"}}"
        );

        let raw = self.generate(&prompt).await?;
        let stripped = strip_code_fences(&raw);
        serde_json::from_str(stripped).map_err(|e| LlmError::Deserialize {
            context: "query intent JSON".to_string(),
            source: e,
        })
    }
}

/// Remove a wrapping markdown code fence, with or without a language tag.
/// Models occasionally fence JSON despite being told not to.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(strip_code_fences(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn json_fence_is_stripped() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), r#"{"a": 1}"#);
    }

    #[test]
    fn bare_fence_is_stripped() {
        let fenced = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), r#"{"a": 1}"#);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  \n"), r#"{"a": 1}"#);
    }
}
