//! Standardization of the numeric (non-text) feature columns

use aura_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-column mean/standard-deviation captured from the training partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on `rows`, all of which must share one width.
    ///
    /// Constant columns get a scale of 1.0 so they transform to zero.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::classifier("cannot fit a scaler on zero rows"))?;
        if rows.iter().any(|r| r.len() != width) {
            return Err(Error::classifier("scaler rows have inconsistent widths"));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((var, v), m) in variance.iter_mut().zip(row).zip(&mean) {
                *var += (v - m) * (v - m);
            }
        }

        let scale = variance
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    /// Standardize `values` in place using the fitted statistics
    pub fn transform_in_place(&self, values: &mut [f64]) {
        for ((v, m), s) in values.iter_mut().zip(&self.mean).zip(&self.scale) {
            *v = (*v - m) / s;
        }
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }
}
