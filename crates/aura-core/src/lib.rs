//! Aura Core
//!
//! Core types and utilities shared across the Aura components.
//!
//! This crate provides:
//! - Distress prediction and severity types produced by the classifiers
//! - Chat modes and response sources used by the orchestrator
//! - The closed set of counseling categories shared by corpus and retriever
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Category, ChatMode, DistressPrediction, ResponseSource, Severity};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Category, ChatMode, DistressPrediction, ResponseSource, Severity};
}
