//! Aura Server
//!
//! HTTP backend for the Aura mental health chatbot. Each chat message runs
//! the crisis keyword scan and the distress classifier first, then takes
//! its reply from the counseling corpus, hosted generation, or the local
//! trained-model responder, in that order of preference.

pub mod cli;
pub mod config;
pub mod context;
pub mod generation;
pub mod orchestrator;
pub mod prompt;
pub mod routes;
pub mod telemetry;
pub mod translate;

pub use config::ServerConfig;
pub use context::{AppContext, AppState};
pub use generation::{GeminiClient, GenerationError, Generator};
pub use orchestrator::{handle_chat, ChatError, ChatRequest, ChatResponse};
pub use routes::create_router;
pub use translate::{HttpTranslator, TranslationError, Translator};
