//! Fixtures and mock collaborators shared by the server tests

#![allow(dead_code)]

use async_trait::async_trait;
use aura_classifiers::{AuxFeatures, DistressClassifier, FeatureRecord, LabeledDataset, ModelHandle, ModelKind, TrainedModel, TrainingOptions};
use aura_core::{Category, DistressPrediction, Error};
use aura_responses::local::{DialogueRow, Intent};
use aura_responses::{Corpus, CorpusEntry, LocalResponder};
use aura_server::{AppContext, GenerationError, Generator, ServerConfig, TranslationError, Translator};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

pub const ANXIETY_REPLY: &str = "Exam anxiety is very common. Try breaking revision into short blocks \
                                 and notice which thoughts make the worry spike.";
pub const GENERAL_REPLY: &str = "Thanks for reaching out. Tell me a little more about what is going \
                                 on for you at the moment.";
pub const DIALOGUE_REPLY: &str = "Uni can be really isolating at first. Want to talk about it?";

pub fn corpus() -> Corpus {
    Corpus::from_entries([
        CorpusEntry::new("Feeling nervous about exams and tests", GENERAL_REPLY)
            .with_categories([Category::General])
            .with_quality(60),
        CorpusEntry::new("Feeling anxious about upcoming tests", ANXIETY_REPLY).with_quality(60),
    ])
}

pub fn local_responder() -> LocalResponder {
    let dialogue = vec![DialogueRow {
        input: "I feel lonely at university".to_string(),
        friend: Some(DIALOGUE_REPLY.to_string()),
        professional: Some("Loneliness during transitions is common.".to_string()),
    }];
    let intents = vec![Intent {
        tag: "greeting".to_string(),
        patterns: vec!["Hello".to_string(), "Hey there".to_string()],
        responses: vec!["Hi! How are you feeling today?".to_string()],
    }];
    LocalResponder::new(intents, dialogue, 0.3)
}

/// Context with no distress model and no hosted collaborators
pub fn context() -> AppContext {
    AppContext::new(ServerConfig::default(), ModelHandle::empty(), corpus(), local_responder()).unwrap()
}

/// Small logistic model over clearly separated synthetic text
pub fn trained_model() -> TrainedModel {
    let distress = ["hopeless", "worthless", "empty", "exhausted"];
    let calm = ["grateful", "sunny", "relaxed", "garden"];
    let mut dataset = LabeledDataset::default();
    for i in 0..40 {
        dataset.records.push(FeatureRecord::new(format!(
            "I feel {} and {} every night",
            distress[i % 4],
            distress[(i + 1) % 4]
        )));
        dataset.labels.push(true);
        dataset.records.push(FeatureRecord::new(format!(
            "a {} afternoon in the {}",
            calm[i % 4],
            calm[(i + 2) % 4]
        )));
        dataset.labels.push(false);
    }
    let options = TrainingOptions {
        model_kind: ModelKind::Logistic,
        ..TrainingOptions::default()
    };
    TrainedModel::train(&dataset, &options).unwrap()
}

/// Generator that always fails, counting calls
#[derive(Default)]
pub struct FailingGenerator {
    calls: AtomicU32,
}

impl FailingGenerator {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(GenerationError::Blocked("quota exceeded".to_string()))
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

/// Generator that returns fixed text and records every prompt
pub struct EchoGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl EchoGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}

/// Translator that tags the text with the target language
pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        Ok(format!("[{target}] {text}"))
    }
}

pub struct BrokenTranslator;

#[async_trait]
impl Translator for BrokenTranslator {
    async fn translate(&self, _text: &str, target: &str) -> Result<String, TranslationError> {
        Err(TranslationError::UnsupportedLanguage(target.to_string()))
    }
}

/// Classifier that always returns an error
pub struct ErroringClassifier;

impl DistressClassifier for ErroringClassifier {
    fn predict(&self, _text: &str, _aux: Option<&AuxFeatures>) -> aura_core::Result<DistressPrediction> {
        Err(Error::classifier("feature width mismatch"))
    }

    fn name(&self) -> &str {
        "erroring"
    }
}

/// Classifier whose prediction panics, as a corrupt model would
pub struct PanickingClassifier;

impl DistressClassifier for PanickingClassifier {
    fn predict(&self, _text: &str, _aux: Option<&AuxFeatures>) -> aura_core::Result<DistressPrediction> {
        panic!("index out of bounds in tree arena")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}
