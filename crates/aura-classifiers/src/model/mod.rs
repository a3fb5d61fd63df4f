//! Statistical classifiers over feature vectors

pub mod forest;
pub mod logistic;

pub use forest::{ForestParams, MaxFeatures, RandomForest};
pub use logistic::{LogisticParams, LogisticRegression};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which classifier family to train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    RandomForest,
    Logistic,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomForest => "random_forest",
            Self::Logistic => "logistic",
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random_forest" | "forest" | "rf" => Ok(Self::RandomForest),
            "logistic" | "logistic_regression" | "lr" => Ok(Self::Logistic),
            other => Err(format!("unknown model kind: {other}")),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fitted classifier of either family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    RandomForest(RandomForest),
    Logistic(LogisticRegression),
}

impl ClassifierModel {
    /// Probability of the distress class for one feature row
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        match self {
            Self::RandomForest(forest) => forest.predict_proba(row),
            Self::Logistic(logistic) => logistic.predict_proba(row),
        }
    }

    /// Structural checks for a model read from an artifact
    pub fn validate(&self) -> aura_core::Result<()> {
        match self {
            Self::RandomForest(forest) => forest.validate(),
            Self::Logistic(_) => Ok(()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::RandomForest(_) => ModelKind::RandomForest,
            Self::Logistic(_) => ModelKind::Logistic,
        }
    }

    /// Impurity-based importances; only forests provide them
    pub fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            Self::RandomForest(forest) => Some(forest.feature_importances()),
            Self::Logistic(_) => None,
        }
    }
}

/// `n / (2 * n_class)` per class, indexed by label; absent classes get 1.0
pub(crate) fn balanced_class_weights(labels: &[bool]) -> [f64; 2] {
    let n = labels.len() as f64;
    let positives = labels.iter().filter(|&&y| y).count() as f64;
    let negatives = n - positives;
    let weight = |count: f64| if count > 0.0 { n / (2.0 * count) } else { 1.0 };
    [weight(negatives), weight(positives)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_weights() {
        let weights = balanced_class_weights(&[true, false, false, false]);
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((weights[1] - 2.0).abs() < 1e-12);
        assert_eq!(balanced_class_weights(&[false, false]), [0.5, 1.0]);
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("random-forest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("Logistic".parse::<ModelKind>().unwrap(), ModelKind::Logistic);
        assert!("svm".parse::<ModelKind>().is_err());
    }
}
