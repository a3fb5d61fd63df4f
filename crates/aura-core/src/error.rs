//! Error types for Aura

/// Result type alias using Aura's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Aura operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A prediction was requested before any model was trained or loaded
    #[error("model not ready: no distress model has been trained or loaded")]
    ModelNotReady,

    /// Classifier fitting or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Labeled dataset errors (missing columns, empty splits, bad labels)
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Counseling corpus errors
    #[error("corpus error: {0}")]
    Corpus(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new corpus error
    pub fn corpus(msg: impl Into<String>) -> Self {
        Self::Corpus(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error only means "no model available yet"
    pub fn is_model_not_ready(&self) -> bool {
        matches!(self, Self::ModelNotReady)
    }
}
