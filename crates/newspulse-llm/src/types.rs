use serde::{Deserialize, Serialize};

/// Structured interpretation of a free-text news query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default = "default_intent")]
    pub intent: String,
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub location_hint: Option<String>,
}

fn default_intent() -> String {
    "search".to_string()
}

impl QueryIntent {
    /// Degraded interpretation used when extraction fails: the raw query
    /// split on whitespace becomes the search terms.
    #[must_use]
    pub fn fallback(query: &str) -> Self {
        Self {
            entities: Vec::new(),
            intent: default_intent(),
            search_terms: query.split_whitespace().map(ToString::to_string).collect(),
            location_hint: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Gemini generateContent wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

impl GenerateRequest {
    pub(crate) fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

impl GenerateResponse {
    /// First candidate's first text part, trimmed. `None` when the model
    /// returned no usable text.
    pub(crate) fn first_text(&self) -> Option<String> {
        let part = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?;
        let text = part.text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}
