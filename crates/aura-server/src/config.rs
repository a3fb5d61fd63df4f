//! Server configuration
//!
//! Layers, lowest precedence first: built-in defaults, an optional YAML
//! file, `AURA__`-prefixed environment variables (`AURA__SERVER__PORT=8080`,
//! `AURA__GENERATION__MODELS=a,b`), then command-line overrides.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Value shipped in the original `.env` template; treated as no key at all
pub const API_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

pub const DEFAULT_CONFIG_PATH: &str = "aura.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ListenConfig,

    /// Distress model artifact produced by `aura-server train`
    pub model_path: PathBuf,

    /// Counseling corpus (`.json`, `.jsonl` or `.csv`)
    pub corpus_path: Option<PathBuf>,

    pub local: LocalConfig,
    pub generation: GenerationConfig,
    pub translation: TranslationConfig,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ListenConfig::default(),
            model_path: PathBuf::from("models/distress_model.json"),
            corpus_path: Some(PathBuf::from("data/counseling_corpus.jsonl")),
            local: LocalConfig::default(),
            generation: GenerationConfig::default(),
            translation: TranslationConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub listen: String,
    pub port: u16,

    /// Tokio worker threads
    pub workers: usize,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0".to_string(),
            port: 5000,
            workers: num_cpus::get(),
        }
    }
}

/// Datasets for the offline responder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub intents_path: Option<PathBuf>,
    pub dialogue_path: Option<PathBuf>,

    /// Cosine similarity a match must exceed
    pub threshold: f64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            intents_path: Some(PathBuf::from("data/intents.json")),
            dialogue_path: Some(PathBuf::from("data/train_data.csv")),
            threshold: aura_responses::local::DEFAULT_THRESHOLD,
        }
    }
}

/// Hosted generation (Gemini `generateContent`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,

    /// Candidate model ids, tried in order at start-up
    pub models: Vec<String>,

    pub timeout_secs: u64,
    pub probe_on_start: bool,

    /// Corpus responses added to the prompt as reference material
    pub rag_context: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            models: vec![
                "gemini-2.0-flash-exp".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-pro".to_string(),
                "gemini-pro".to_string(),
            ],
            timeout_secs: 30,
            probe_on_start: true,
            rag_context: 3,
        }
    }
}

impl GenerationConfig {
    /// Configured key, else `GEMINI_API_KEY`; the template placeholder and
    /// blank values count as absent
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| is_real_key(k))
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|k| is_real_key(k)))
    }
}

fn is_real_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != API_KEY_PLACEHOLDER
}

/// LibreTranslate-compatible endpoint; translation is off without one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_any_origin: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
            origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load from `path` (optional when `None`, falling back to
    /// `aura.yaml`) and the environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::new(DEFAULT_CONFIG_PATH, FileFormat::Yaml).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("AURA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("generation.models")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse a YAML document on top of the defaults
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(content, FileFormat::Yaml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server.listen, self.server.port)
    }
}
