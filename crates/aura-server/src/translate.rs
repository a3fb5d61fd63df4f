//! Reply translation
//!
//! Only hosted-generation replies are translated. A failed translation
//! keeps the English text.

use crate::config::TranslationConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation service returned {0}")]
    Status(StatusCode),

    #[error("unsupported target language: {0}")]
    UnsupportedLanguage(String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError>;
}

/// True for language codes that need no translation
pub fn is_english(language: &str) -> bool {
    let language = language.trim();
    language.is_empty()
        || language.eq_ignore_ascii_case("en")
        || language.to_ascii_lowercase().starts_with("en-")
}

/// Client for a LibreTranslate-compatible `POST /translate` endpoint
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

impl HttpTranslator {
    /// `None` when no endpoint is configured
    pub fn from_config(config: &TranslationConfig) -> Result<Option<Self>, TranslationError> {
        let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Some(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }))
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        let target = target.trim().split(['-', '_']).next().unwrap_or_default();
        if target.is_empty() || !target.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TranslationError::UnsupportedLanguage(target.to_string()));
        }

        let response = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .json(&TranslateRequest {
                q: text,
                source: "en",
                target,
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status));
        }
        let body: TranslateResponse = response.json().await?;
        Ok(body.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_english() {
        assert!(is_english("en"));
        assert!(is_english("EN-us"));
        assert!(is_english(""));
        assert!(!is_english("hi"));
        assert!(!is_english("es"));
    }

    #[test]
    fn test_no_endpoint_means_no_translator() {
        let translator = HttpTranslator::from_config(&TranslationConfig::default()).unwrap();
        assert!(translator.is_none());
    }

    #[tokio::test]
    async fn test_rejects_malformed_language_codes() {
        let translator = HttpTranslator::from_config(&TranslationConfig {
            endpoint: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        let err = translator.translate("hello", "../etc").await.unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedLanguage(_)));
    }
}
