//! Training configuration

use crate::model::{ForestParams, LogisticParams, ModelKind};
use crate::tfidf::TfidfConfig;
use aura_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the training protocol needs besides the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    #[serde(default = "default_fraction")]
    pub test_fraction: f64,

    #[serde(default = "default_fraction")]
    pub val_fraction: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub model_kind: ModelKind,

    #[serde(default)]
    pub tfidf: TfidfConfig,

    #[serde(default)]
    pub forest: ForestParams,

    #[serde(default)]
    pub logistic: LogisticParams,

    /// Validation/test accuracy gap above which overfitting is flagged
    #[serde(default = "default_overfit_tolerance")]
    pub overfit_tolerance: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_fraction: default_fraction(),
            val_fraction: default_fraction(),
            seed: default_seed(),
            model_kind: ModelKind::default(),
            tfidf: TfidfConfig::default(),
            forest: ForestParams::default(),
            logistic: LogisticParams::default(),
            overfit_tolerance: default_overfit_tolerance(),
        }
    }
}

fn default_fraction() -> f64 {
    0.1
}

fn default_seed() -> u64 {
    42
}

fn default_overfit_tolerance() -> f64 {
    0.05
}

impl TrainingOptions {
    /// Load from a YAML file; absent keys keep their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TrainingOptions::default();
        assert_eq!(options.seed, 42);
        assert_eq!(options.test_fraction, 0.1);
        assert_eq!(options.tfidf.max_features, Some(3000));
        assert_eq!(options.forest.n_estimators, 200);
        assert_eq!(options.logistic.c, 0.1);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "model_kind: logistic\nseed: 7\nforest:\n  n_estimators: 10\n";
        let options: TrainingOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.model_kind, ModelKind::Logistic);
        assert_eq!(options.seed, 7);
        assert_eq!(options.forest.n_estimators, 10);
        assert_eq!(options.forest.max_depth, Some(20));
        assert_eq!(options.val_fraction, 0.1);
    }
}
