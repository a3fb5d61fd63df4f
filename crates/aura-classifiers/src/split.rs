//! Stratified train / validation / test partitioning

use aura_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Row indices of each partition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSplit {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

impl DataSplit {
    /// Split `labels` so every partition keeps the overall class balance.
    ///
    /// Each class is shuffled with a generator seeded from `seed`, then cut
    /// into test, validation and train slices in that order. Indices within
    /// a partition are returned sorted.
    pub fn stratified(
        labels: &[bool],
        test_fraction: f64,
        val_fraction: f64,
        seed: u64,
    ) -> Result<Self> {
        let valid = |f: f64| (0.0..1.0).contains(&f);
        if !valid(test_fraction) || !valid(val_fraction) || test_fraction + val_fraction >= 1.0 {
            return Err(Error::config(format!(
                "invalid split fractions: test={test_fraction}, validation={val_fraction}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut split = Self::default();

        for class in [false, true] {
            let mut members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, &y)| y == class)
                .map(|(i, _)| i)
                .collect();
            members.shuffle(&mut rng);

            let n = members.len();
            let n_test = (n as f64 * test_fraction).round() as usize;
            let n_val = ((n as f64 * val_fraction).round() as usize).min(n - n_test);

            split.test.extend_from_slice(&members[..n_test]);
            split.validation.extend_from_slice(&members[n_test..n_test + n_val]);
            split.train.extend_from_slice(&members[n_test + n_val..]);
        }

        split.train.sort_unstable();
        split.validation.sort_unstable();
        split.test.sort_unstable();

        if split.train.is_empty() {
            return Err(Error::dataset("training partition is empty"));
        }
        Ok(split)
    }

    /// No index appears in more than one partition
    pub fn is_disjoint(&self) -> bool {
        let mut all: Vec<usize> = self
            .train
            .iter()
            .chain(&self.validation)
            .chain(&self.test)
            .copied()
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        all.len() == total
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
