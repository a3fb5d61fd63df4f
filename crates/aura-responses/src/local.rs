//! Local trained-model responder
//!
//! Answers without any network call by matching the message against two
//! small datasets:
//!
//! 1. Dialogue rows: `User Input` with a friend and a professional reply
//! 2. Intent patterns: `{"intents": [{"tag", "patterns", "responses"}]}`
//!
//! Text on both sides is stemmed and stop-word filtered, then compared by
//! TF-IDF cosine similarity. Matches must clear the similarity threshold.
//! If neither dataset matches, the first emotional keyword in the message
//! picks a canned reply, and failing that a generic fallback is returned.

use crate::wellness::detect_emotion;
use aura_classifiers::text::{is_stop_word, tokenize};
use aura_classifiers::{cosine_similarity, TfidfConfig, TfidfVectorizer};
use aura_core::{ChatMode, Error, Result};
use rand::seq::SliceRandom;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const DEFAULT_THRESHOLD: f64 = 0.3;

pub const EMPTY_INPUT_REPLY: &str = "I'm here to listen. Please tell me what's on your mind.";

pub const FALLBACK_REPLY: &str =
    "I understand you're going through something. Can you tell me more about how you're feeling?";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Intent {
    pub tag: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub responses: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IntentsFile {
    intents: Vec<Intent>,
}

/// One row of the dialogue CSV
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DialogueRow {
    #[serde(rename = "User Input")]
    pub input: String,
    #[serde(rename = "Friend Mode Response", default)]
    pub friend: Option<String>,
    #[serde(rename = "Professional Mode Response", default)]
    pub professional: Option<String>,
}

impl DialogueRow {
    /// Reply for `mode`, or the other mode's reply when that one is blank
    fn response_for(&self, mode: ChatMode) -> Option<&str> {
        let (preferred, other) = match mode {
            ChatMode::Friend => (&self.friend, &self.professional),
            ChatMode::Professional => (&self.professional, &self.friend),
        };
        preferred
            .as_deref()
            .map(clean_response)
            .filter(|r| !r.is_empty())
            .or_else(|| other.as_deref().map(clean_response).filter(|r| !r.is_empty()))
    }
}

fn clean_response(text: &str) -> &str {
    text.trim().trim_matches('"').trim()
}

/// Which rule produced a [`LocalReply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Dialogue,
    Intent,
    Emotion,
    Fallback,
    EmptyInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalReply {
    pub text: String,
    pub kind: ReplyKind,
    pub similarity: Option<f64>,
}

impl LocalReply {
    fn fixed(text: &str, kind: ReplyKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
            similarity: None,
        }
    }
}

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Lower-case, drop stop words and stem; tokens joined by single spaces
pub fn preprocess(text: &str) -> String {
    let stemmer = stemmer();
    tokenize(text)
        .iter()
        .filter(|t| t.chars().all(char::is_alphanumeric) && !is_stop_word(t))
        .map(|t| stemmer.stem(t).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Intent pattern with the index of the intent it belongs to
#[derive(Debug, Clone)]
struct PatternRef {
    intent: usize,
    vector: Vec<f64>,
}

/// Similarity-matching responder built once at start-up; read-only after
#[derive(Debug, Clone, Default)]
pub struct LocalResponder {
    vectorizer: Option<TfidfVectorizer>,
    dialogue: Vec<DialogueRow>,
    dialogue_vectors: Vec<Vec<f64>>,
    intents: Vec<Intent>,
    patterns: Vec<PatternRef>,
    threshold: f64,
}

impl LocalResponder {
    /// Fit on both datasets. An empty or unusable vocabulary leaves only
    /// the emotional keyword and fallback replies.
    pub fn new(intents: Vec<Intent>, dialogue: Vec<DialogueRow>, threshold: f64) -> Self {
        let dialogue: Vec<DialogueRow> = dialogue
            .into_iter()
            .filter(|row| !row.input.trim().is_empty() && row.response_for(ChatMode::Friend).is_some())
            .collect();
        let intents: Vec<Intent> = intents
            .into_iter()
            .filter(|i| !i.patterns.is_empty() && !i.responses.is_empty())
            .collect();

        let dialogue_docs: Vec<String> = dialogue.iter().map(|r| preprocess(&r.input)).collect();
        let pattern_docs: Vec<(usize, String)> = intents
            .iter()
            .enumerate()
            .flat_map(|(i, intent)| intent.patterns.iter().map(move |p| (i, preprocess(p))))
            .collect();

        let documents: Vec<&str> = dialogue_docs
            .iter()
            .map(String::as_str)
            .chain(pattern_docs.iter().map(|(_, d)| d.as_str()))
            .collect();

        let vectorizer = if documents.is_empty() {
            None
        } else {
            match TfidfVectorizer::fit(TfidfConfig::similarity_matching(), &documents) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(error = %e, "Local responder vocabulary is empty; similarity matching disabled");
                    None
                }
            }
        };

        let (dialogue_vectors, patterns) = match &vectorizer {
            Some(v) => (
                dialogue_docs.iter().map(|d| v.transform(d)).collect(),
                pattern_docs
                    .iter()
                    .map(|(intent, d)| PatternRef {
                        intent: *intent,
                        vector: v.transform(d),
                    })
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        info!(
            dialogue_rows = dialogue.len(),
            intent_patterns = patterns.len(),
            vocabulary = vectorizer.as_ref().map_or(0, TfidfVectorizer::len),
            "Local responder ready"
        );

        Self {
            vectorizer,
            dialogue,
            dialogue_vectors,
            intents,
            patterns,
            threshold,
        }
    }

    /// Build from optional files; a configured file that fails to parse is
    /// an error, a missing path just means that dataset is absent
    pub fn from_paths(
        intents_path: Option<&Path>,
        dialogue_path: Option<&Path>,
        threshold: f64,
    ) -> Result<Self> {
        let intents = match intents_path {
            Some(path) => parse_intents(&std::fs::read_to_string(path)?)?,
            None => Vec::new(),
        };
        let dialogue = match dialogue_path {
            Some(path) => parse_dialogue(std::fs::File::open(path)?)?,
            None => Vec::new(),
        };
        Ok(Self::new(intents, dialogue, threshold))
    }

    /// True when at least one dataset contributed patterns
    pub fn has_patterns(&self) -> bool {
        self.vectorizer.is_some()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn reply(&self, message: &str, mode: ChatMode) -> LocalReply {
        if message.trim().is_empty() {
            return LocalReply::fixed(EMPTY_INPUT_REPLY, ReplyKind::EmptyInput);
        }

        if let Some(vectorizer) = &self.vectorizer {
            let query = vectorizer.transform(&preprocess(message));

            if let Some((idx, sim)) = best_above(&query, &self.dialogue_vectors, self.threshold) {
                if let Some(text) = self.dialogue[idx].response_for(mode) {
                    debug!(row = idx, similarity = sim, "Dialogue match");
                    return LocalReply {
                        text: text.to_string(),
                        kind: ReplyKind::Dialogue,
                        similarity: Some(sim),
                    };
                }
            }

            let pattern_vectors = self.patterns.iter().map(|p| &p.vector);
            if let Some((idx, sim)) = best_above(&query, pattern_vectors, self.threshold) {
                let intent = &self.intents[self.patterns[idx].intent];
                if let Some(text) = intent.responses.choose(&mut rand::thread_rng()) {
                    debug!(tag = %intent.tag, similarity = sim, "Intent match");
                    return LocalReply {
                        text: text.clone(),
                        kind: ReplyKind::Intent,
                        similarity: Some(sim),
                    };
                }
            }
        }

        match detect_emotion(message) {
            Some(emotion) => LocalReply::fixed(emotion.response, ReplyKind::Emotion),
            None => LocalReply::fixed(FALLBACK_REPLY, ReplyKind::Fallback),
        }
    }
}

/// Index and similarity of the first row with the highest similarity,
/// if that similarity exceeds `threshold`
fn best_above<'a>(
    query: &[f64],
    rows: impl IntoIterator<Item = &'a Vec<f64>>,
    threshold: f64,
) -> Option<(usize, f64)> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| (i, cosine_similarity(query, row)))
        .fold(None, |best: Option<(usize, f64)>, (i, sim)| match best {
            Some((_, b)) if b >= sim => best,
            _ => Some((i, sim)),
        })
        .filter(|(_, sim)| *sim > threshold)
}

pub fn parse_intents(content: &str) -> Result<Vec<Intent>> {
    let file: IntentsFile = serde_json::from_str(content)?;
    Ok(file.intents)
}

pub fn parse_dialogue<R: std::io::Read>(reader: R) -> Result<Vec<DialogueRow>> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    csv.deserialize()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| Error::corpus(format!("dialogue row {}: {e}", i + 2))))
        .collect()
}
