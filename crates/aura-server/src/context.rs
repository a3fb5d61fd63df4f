//! Application context shared by every request
//!
//! Built once at start-up and never mutated afterwards. The distress model
//! is the one swappable piece, and it swaps through [`ModelHandle`].

use crate::config::ServerConfig;
use crate::generation::{GeminiClient, Generator};
use crate::translate::{HttpTranslator, Translator};
use anyhow::Context as _;
use aura_classifiers::{CrisisDetector, DistressClassifier, ModelHandle};
use aura_responses::{Corpus, LocalResponder};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub type AppState = Arc<AppContext>;

pub struct AppContext {
    pub config: ServerConfig,
    pub crisis: CrisisDetector,
    pub model: Arc<ModelHandle>,

    /// What the chat path scores messages with; the model handle unless replaced
    pub classifier: Arc<dyn DistressClassifier>,
    pub corpus: Corpus,
    pub local: LocalResponder,
    pub generator: Option<Arc<dyn Generator>>,
    pub translator: Option<Arc<dyn Translator>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppContext {
    /// Context with no hosted collaborators and no metrics recorder
    pub fn new(
        config: ServerConfig,
        model: ModelHandle,
        corpus: Corpus,
        local: LocalResponder,
    ) -> anyhow::Result<Self> {
        let model = Arc::new(model);
        Ok(Self {
            config,
            crisis: CrisisDetector::new()?,
            classifier: Arc::clone(&model) as Arc<dyn DistressClassifier>,
            model,
            corpus,
            local,
            generator: None,
            translator: None,
            metrics: None,
        })
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn DistressClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Load every artifact named by `config` and resolve the hosted model.
    ///
    /// Missing data files degrade the matching feature; only a configured
    /// file that exists but cannot be parsed stops start-up.
    pub async fn build(config: ServerConfig) -> anyhow::Result<Self> {
        let model = ModelHandle::load_or_empty(&config.model_path);

        let corpus = match &config.corpus_path {
            Some(path) if path.exists() => Corpus::from_path(path)
                .with_context(|| format!("Failed to load corpus {}", path.display()))?,
            Some(path) => {
                warn!(path = %path.display(), "Corpus file not found; professional mode uses generation only");
                Corpus::default()
            }
            None => Corpus::default(),
        };

        let local = LocalResponder::from_paths(
            existing_dataset(config.local.intents_path.as_deref()),
            existing_dataset(config.local.dialogue_path.as_deref()),
            config.local.threshold,
        )
        .context("Failed to load local responder datasets")?;

        let generator = GeminiClient::resolve(&config.generation)
            .await
            .map(|client| Arc::new(client) as Arc<dyn Generator>);
        let translator = HttpTranslator::from_config(&config.translation)
            .context("Failed to build translation client")?
            .map(|client| Arc::new(client) as Arc<dyn Translator>);

        info!(
            distress_model = model.is_ready(),
            corpus_entries = corpus.len(),
            local_patterns = local.has_patterns(),
            generation = generator.as_ref().map(|g| g.model_id()).unwrap_or("disabled"),
            translation = translator.is_some(),
            "Application context ready"
        );

        let mut context = Self::new(config, model, corpus, local)?;
        context.generator = generator;
        context.translator = translator;
        Ok(context)
    }

    pub fn generation_enabled(&self) -> bool {
        self.generator.is_some()
    }
}

fn existing_dataset(path: Option<&Path>) -> Option<&Path> {
    let path = path?;
    if path.exists() {
        Some(path)
    } else {
        warn!(path = %path.display(), "Local responder dataset not found");
        None
    }
}
