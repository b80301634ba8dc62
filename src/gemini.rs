//! Gemini `generateContent` adapter for conceptual path suggestions.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::request::ConceptualPathRequest;
use crate::traits::PathSuggester;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Request body: the rendered prompt plus the structured request as JSON.
pub(crate) fn request_body(request: &ConceptualPathRequest) -> serde_json::Result<Value> {
    let structured = serde_json::to_string(request)?;
    Ok(json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": request.render_prompt() },
                { "text": format!("Structured input: {}", structured) }
            ]
        }],
        "generationConfig": { "responseMimeType": "application/json" }
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// JSON carried by the first candidate's text, if any.
    pub(crate) fn into_output(self) -> Option<Value> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        let text = strip_code_fence(text.trim());
        match serde_json::from_str(text) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "model output is not JSON");
                None
            }
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

impl PathSuggester for GeminiClient {
    fn suggest(&self, request: &ConceptualPathRequest) -> Option<Value> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            warn!("no Gemini API key configured, skipping suggestion");
            return None;
        };
        let body = match request_body(request) {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "could not serialize path request, skipping suggestion");
                return None;
            }
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<GenerateContentResponse>());

        match response {
            Ok(body) => {
                debug!(candidates = body.candidates.len(), "Gemini responded");
                body.into_output()
            }
            Err(err) => {
                warn!(error = %err, "Gemini request failed");
                None
            }
        }
    }
}
