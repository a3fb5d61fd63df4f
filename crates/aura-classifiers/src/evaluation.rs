//! Binary classification metrics and the overfitting check

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for the distress (positive) class
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,

    /// `[[tn, fp], [fn, tp]]`
    pub confusion_matrix: [[usize; 2]; 2],
}

impl EvaluationMetrics {
    pub fn compute(predicted: &[bool], actual: &[bool]) -> Self {
        let mut cm = [[0usize; 2]; 2];
        for (&p, &a) in predicted.iter().zip(actual) {
            cm[usize::from(a)][usize::from(p)] += 1;
        }
        let [[tn, fp], [fn_, tp]] = cm;
        let total = tn + fp + fn_ + tp;

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy: ratio(tp + tn, total),
            precision,
            recall,
            f1_score,
            support: total,
            confusion_matrix: cm,
        }
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy={:.4} precision={:.4} recall={:.4} f1={:.4} (n={})",
            self.accuracy, self.precision, self.recall, self.f1_score, self.support
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverfittingVerdict {
    Excellent,
    Good,
    Warning,
}

/// Validation vs test accuracy gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverfittingCheck {
    pub gap: f64,
    pub verdict: OverfittingVerdict,
}

impl OverfittingCheck {
    /// Gaps under 3pp are excellent, under `tolerance` good, otherwise a warning
    pub fn compare(validation: &EvaluationMetrics, test: &EvaluationMetrics, tolerance: f64) -> Self {
        let gap = (validation.accuracy - test.accuracy).abs();
        let verdict = if gap < 0.03 {
            OverfittingVerdict::Excellent
        } else if gap < tolerance {
            OverfittingVerdict::Good
        } else {
            OverfittingVerdict::Warning
        };
        Self { gap, verdict }
    }

    pub fn is_warning(&self) -> bool {
        self.verdict == OverfittingVerdict::Warning
    }
}
