//! Aura Classifiers
//!
//! Two-stage distress detection for incoming chat messages.
//!
//! - Stage 1: [`CrisisDetector`], a phrase scan that always runs and cannot
//!   be overruled.
//! - Stage 2: [`TrainedModel`], a statistical classifier over TF-IDF terms
//!   plus lexicon, social and sentiment columns.
//!
//! Training, evaluation and artifact persistence live here as well, so the
//! server and the offline `train` command share one code path. Everything
//! runs on CPU with no external services.

pub mod classifier;
pub mod config;
pub mod crisis;
pub mod dataset;
pub mod detector;
pub mod evaluation;
pub mod features;
pub mod handle;
pub mod model;
pub mod scaler;
pub mod split;
pub mod text;
pub mod tfidf;

pub use classifier::DistressClassifier;
pub use config::TrainingOptions;
pub use crisis::{CrisisDetector, CrisisScan, CRISIS_PHRASES};
pub use dataset::LabeledDataset;
pub use detector::{FeatureImportance, TrainedModel, TrainingReport, FORMAT_VERSION};
pub use evaluation::{EvaluationMetrics, OverfittingCheck, OverfittingVerdict};
pub use features::{AuxFeatures, FeatureExtractor, FeatureRecord, FeatureVector};
pub use handle::ModelHandle;
pub use model::{ClassifierModel, ModelKind};
pub use split::DataSplit;
pub use tfidf::{cosine_similarity, TfidfConfig, TfidfVectorizer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::DistressClassifier;
    pub use crate::crisis::CrisisDetector;
    pub use crate::detector::TrainedModel;
    pub use crate::features::{AuxFeatures, FeatureRecord};
    pub use crate::handle::ModelHandle;
}
