//! Hosted text generation
//!
//! The orchestrator only sees [`Generator`]; failures come back as
//! [`GenerationError`] values and select the local fallback path.

use crate::config::GenerationConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("generation blocked: {0}")]
    Blocked(String),

    #[error("generation returned no text")]
    Empty,
}

#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a reply for a fully assembled prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model identifier, for health reporting
    fn model_id(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, GenerationError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerationError::Blocked(reason));
        }
        let candidate = self.candidates.into_iter().next().ok_or(GenerationError::Empty)?;
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return match candidate.finish_reason.as_deref() {
                Some("SAFETY") => Err(GenerationError::Blocked("SAFETY".to_string())),
                _ => Err(GenerationError::Empty),
            };
        }
        Ok(text.to_string())
    }
}

/// Client for the Gemini `generateContent` REST API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: normalize_model_id(&model.into()),
        })
    }

    /// Pick the first candidate model that answers `GET models/{id}`.
    ///
    /// Runs once at start-up. `None` means generation stays disabled.
    pub async fn resolve(config: &GenerationConfig) -> Option<Self> {
        if !config.enabled {
            info!("Hosted generation disabled by configuration");
            return None;
        }
        let Some(api_key) = config.effective_api_key() else {
            info!("No Gemini API key found; using the trained model only");
            return None;
        };

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        for model in &config.models {
            let client = match Self::new(api_key.clone(), config.base_url.clone(), model, timeout) {
                Ok(client) => client,
                Err(e) => {
                    warn!(error = %e, "Failed to build generation client");
                    return None;
                }
            };
            if !config.probe_on_start {
                info!(model = %client.model, "Hosted generation enabled without probing");
                return Some(client);
            }
            match client.probe().await {
                Ok(()) => {
                    info!(model = %client.model, "Hosted generation enabled");
                    return Some(client);
                }
                Err(e) => warn!(model = %model, error = %e, "Generation model unavailable"),
            }
        }

        warn!(candidates = config.models.len(), "No generation model answered; using the trained model only");
        None
    }

    /// Check that the model exists and the key is accepted
    pub async fn probe(&self) -> Result<(), GenerationError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GenerationError::Status { status, body })
}

/// Accept both `gemini-pro` and `models/gemini-pro`
fn normalize_model_id(model: &str) -> String {
    model.trim().trim_start_matches("models/").to_string()
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling generateContent");
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let parsed: GenerateResponse = check_status(response).await?.json().await?;
        parsed.into_text()
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, GenerationError> {
        serde_json::from_str::<GenerateResponse>(json).unwrap().into_text()
    }

    #[test]
    fn test_text_parts_are_joined_and_trimmed() {
        let text = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "  Hello "}, {"text": "there.\n"}]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(text, "Hello there.");
    }

    #[test]
    fn test_blocked_and_empty_responses() {
        assert!(matches!(
            parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(GenerationError::Blocked(_))
        ));
        assert!(matches!(parse(r#"{"candidates": []}"#), Err(GenerationError::Empty)));
        assert!(matches!(
            parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#),
            Err(GenerationError::Blocked(_))
        ));
    }

    #[test]
    fn test_model_id_normalization() {
        assert_eq!(normalize_model_id("models/gemini-pro"), "gemini-pro");
        assert_eq!(normalize_model_id(" gemini-1.5-flash "), "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_resolve_without_key_disables_generation() {
        let config = GenerationConfig {
            api_key: Some(crate::config::API_KEY_PLACEHOLDER.to_string()),
            probe_on_start: false,
            ..Default::default()
        };
        // GEMINI_API_KEY may be set in the environment; only assert when it is not
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(GeminiClient::resolve(&config).await.is_none());
        }

        let disabled = GenerationConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(GeminiClient::resolve(&disabled).await.is_none());
    }
}
