//! Chat orchestration
//!
//! One pass per message, terminal on the first source that produces text:
//!
//! ```text
//! validate -> crisis scan -> distress classifier
//!   -> professional mode and corpus match  => counseling_dataset
//!   -> generation enabled and use_ai       => gemini (translated)
//!   -> local responder                     => trained_model
//! ```
//!
//! The crisis scan and classifier always run before any network call.

use crate::context::AppContext;
use crate::prompt::build_prompt;
use crate::telemetry;
use crate::translate::is_english;
use aura_classifiers::DistressClassifier;
use aura_core::{ChatMode, DistressPrediction, Error, ResponseSource};
use aura_responses::CRISIS_RESPONSE;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,

    /// Unknown values fall back to friend
    pub mode: Option<String>,

    #[serde(rename = "useAI", alias = "use_ai")]
    pub use_ai: Option<bool>,

    pub language: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ChatMode) -> Self {
        self.mode = Some(mode.as_str().to_string());
        self
    }

    pub fn with_use_ai(mut self, use_ai: bool) -> Self {
        self.use_ai = Some(use_ai);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn chat_mode(&self) -> ChatMode {
        self.mode
            .as_deref()
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub mode: ChatMode,
    pub source: ResponseSource,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub distress_detection: Option<DistressPrediction>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("{0}")]
    Internal(String),
}

/// Run one chat message through the pipeline
pub async fn handle_chat(ctx: &AppContext, request: ChatRequest) -> Result<ChatResponse, ChatError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    let mode = request.chat_mode();
    let use_ai = request.use_ai.unwrap_or(true);
    metrics::counter!(telemetry::CHAT_REQUESTS).increment(1);
    debug!(mode = %mode.as_str(), use_ai, language = request.language(), "Handling chat message");

    let scan = ctx.crisis.scan(message);
    if scan.is_crisis() {
        metrics::counter!(telemetry::CRISIS_OVERRIDES).increment(1);
        warn!(phrases = ?scan.matched, "Crisis phrase matched; distress override applied");
    }

    let classified = classify(ctx, message).await;
    let distress = DistressPrediction::merge(classified, scan.is_crisis());

    let (response, source) = if let Some(best) = professional_match(ctx, mode, message) {
        (best, ResponseSource::CounselingDataset)
    } else if let Some(generated) = generate(ctx, message, mode, use_ai, request.language()).await {
        (generated, ResponseSource::Gemini)
    } else if scan.is_crisis() {
        (CRISIS_RESPONSE.to_string(), ResponseSource::TrainedModel)
    } else {
        (ctx.local.reply(message, mode).text, ResponseSource::TrainedModel)
    };

    metrics::counter!(telemetry::RESPONSES, "source" => source.as_str()).increment(1);
    info!(source = source.as_str(), mode = mode.as_str(), "Chat reply ready");

    Ok(ChatResponse {
        response,
        mode,
        source,
        distress_detection: distress,
    })
}

/// Distress classifier on the blocking pool. Any failure, a panic
/// included, becomes "no signal" so the keyword override still stands.
async fn classify(ctx: &AppContext, message: &str) -> Option<DistressPrediction> {
    let classifier = Arc::clone(&ctx.classifier);
    let text = message.to_string();
    let started = Instant::now();

    let outcome = match tokio::task::spawn_blocking(move || classifier.predict(&text, None)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::counter!(telemetry::CLASSIFIER_FAILURES).increment(1);
            warn!(error = %e, classifier = ctx.classifier.name(), "Distress classifier task failed; continuing without it");
            return None;
        }
    };

    match outcome {
        Ok(prediction) => {
            metrics::histogram!(telemetry::CLASSIFIER_LATENCY).record(started.elapsed().as_micros() as f64);
            debug!(
                classifier = ctx.classifier.name(),
                probability = prediction.probability,
                severity = %prediction.severity,
                "Distress classifier ran"
            );
            Some(prediction)
        }
        Err(Error::ModelNotReady) => {
            debug!("No distress model loaded; keyword override only");
            None
        }
        Err(e) => {
            metrics::counter!(telemetry::CLASSIFIER_FAILURES).increment(1);
            warn!(error = %e, classifier = ctx.classifier.name(), "Distress classifier failed; continuing without it");
            None
        }
    }
}

fn professional_match(ctx: &AppContext, mode: ChatMode, message: &str) -> Option<String> {
    if mode != ChatMode::Professional {
        return None;
    }
    let best = ctx.corpus.best_match(message)?;
    debug!(entry = best.index, score = best.score, "Counseling corpus match");
    Some(best.entry.response.clone())
}

/// Hosted generation with optional corpus references. `None` selects the
/// local fallback.
async fn generate(
    ctx: &AppContext,
    message: &str,
    mode: ChatMode,
    use_ai: bool,
    language: &str,
) -> Option<String> {
    if !use_ai {
        return None;
    }
    let generator = ctx.generator.as_ref()?;

    let references: Vec<&str> = ctx
        .corpus
        .top_matches(message, ctx.config.generation.rag_context)
        .into_iter()
        .map(|m| m.entry.response.as_str())
        .collect();
    let prompt = build_prompt(message, mode, &references);

    let text = match generator.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            metrics::counter!(telemetry::GENERATION_FAILURES).increment(1);
            warn!(error = %e, model = generator.model_id(), "Generation failed; falling back to trained model");
            return None;
        }
    };

    Some(translate(ctx, text, language).await)
}

async fn translate(ctx: &AppContext, text: String, language: &str) -> String {
    if is_english(language) {
        return text;
    }
    let Some(translator) = ctx.translator.as_ref() else {
        debug!(language, "No translation service configured; replying in English");
        return text;
    };
    match translator.translate(&text, language).await {
        Ok(translated) => translated,
        Err(e) => {
            metrics::counter!(telemetry::TRANSLATION_FAILURES).increment(1);
            warn!(error = %e, language, "Translation failed; replying in English");
            text
        }
    }
}
