//! L2-regularised binary logistic regression

use super::balanced_class_weights;
use aura_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse regularisation strength
    #[serde(default = "default_c")]
    pub c: f64,

    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Stop once every gradient component is below this magnitude
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Reweight classes inversely to their frequency
    #[serde(default = "default_true")]
    pub balanced: bool,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: default_c(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            balanced: true,
        }
    }
}

fn default_c() -> f64 {
    0.1
}

fn default_max_iter() -> usize {
    1000
}

fn default_tolerance() -> f64 {
    1e-5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    /// Fit with full-batch gradient descent.
    ///
    /// Minimises the sample-weighted mean log loss plus `||w||^2 / (2 C W)`,
    /// where `W` is the total sample weight. The step size is the inverse of
    /// the loss's Lipschitz bound, so no learning rate needs tuning.
    pub fn fit(params: &LogisticParams, rows: &[&[f64]], labels: &[bool]) -> Result<Self> {
        let width = rows
            .first()
            .map(|r| r.len())
            .ok_or_else(|| Error::classifier("cannot fit logistic regression on zero rows"))?;
        if rows.len() != labels.len() {
            return Err(Error::classifier("row and label counts differ"));
        }
        if params.c <= 0.0 {
            return Err(Error::config("logistic regression C must be positive"));
        }

        let class_weight = if params.balanced {
            balanced_class_weights(labels)
        } else {
            [1.0, 1.0]
        };
        let sample_weight: Vec<f64> = labels
            .iter()
            .map(|&y| class_weight[usize::from(y)])
            .collect();
        let total_weight: f64 = sample_weight.iter().sum();
        let l2 = 1.0 / (params.c * total_weight);

        let max_sq_norm = rows
            .iter()
            .map(|r| r.iter().map(|v| v * v).sum::<f64>() + 1.0)
            .fold(0.0_f64, f64::max);
        let lipschitz = 0.25 * max_sq_norm + l2;
        let step = 1.0 / lipschitz;

        let mut weights = vec![0.0; width];
        let mut bias = 0.0;
        let mut grad = vec![0.0; width];

        for iteration in 0..params.max_iter {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_bias = 0.0;

            for ((row, &y), &sw) in rows.iter().zip(labels).zip(&sample_weight) {
                let z = bias + dot(&weights, row);
                let err = sw * (sigmoid(z) - if y { 1.0 } else { 0.0 }) / total_weight;
                for (g, x) in grad.iter_mut().zip(row.iter()) {
                    *g += err * x;
                }
                grad_bias += err;
            }
            for (g, w) in grad.iter_mut().zip(&weights) {
                *g += l2 * w;
            }

            let max_grad = grad
                .iter()
                .fold(grad_bias.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < params.tolerance {
                debug!(iteration, "logistic regression converged");
                break;
            }

            for (w, g) in weights.iter_mut().zip(&grad) {
                *w -= step * g;
            }
            bias -= step * grad_bias;
        }

        Ok(Self { weights, bias })
    }

    /// Probability of the positive (distress) class
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.bias + dot(&self.weights, row))
    }

    pub fn width(&self) -> usize {
        self.weights.len()
    }
}

fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, x)| w * x).sum()
}
