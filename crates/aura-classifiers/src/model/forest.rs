//! Random forest of Gini-split CART trees

use super::balanced_class_weights;
use aura_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How many features each split may consider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    fn resolve(&self, width: usize) -> usize {
        let n = match self {
            Self::Sqrt => (width as f64).sqrt().floor() as usize,
            Self::All => width,
            Self::Fixed(n) => *n,
        };
        n.clamp(1, width.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    #[serde(default = "default_estimators")]
    pub n_estimators: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,

    #[serde(default = "default_max_features")]
    pub max_features: MaxFeatures,

    /// Reweight classes inversely to their frequency
    #[serde(default = "default_true")]
    pub balanced: bool,

    /// Draw a bootstrap sample per tree
    #[serde(default = "default_true")]
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: default_estimators(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            max_features: default_max_features(),
            balanced: true,
            bootstrap: true,
        }
    }
}

fn default_estimators() -> usize {
    200
}

fn default_max_depth() -> Option<usize> {
    Some(20)
}

fn default_min_samples_split() -> usize {
    5
}

fn default_min_samples_leaf() -> usize {
    2
}

fn default_max_features() -> MaxFeatures {
    MaxFeatures::Sqrt
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum Node {
    Leaf {
        /// Weighted fraction of distress samples that reached this leaf
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Single tree stored as an arena; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Children must sit after their parent inside the arena, which is how
    /// the builder lays them out and rules out cycles.
    fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::classifier("decision tree has no nodes"));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(Error::classifier(format!(
                            "node {index} points at invalid child {child} (tree has {} nodes)",
                            self.nodes.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { probability } => return *probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

struct TreeBuilder<'a> {
    params: &'a ForestParams,
    rows: &'a [&'a [f64]],
    labels: &'a [bool],
    class_weight: [f64; 2],
    features_per_split: usize,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

fn gini(pos: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let p = pos / total;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

impl<'a> TreeBuilder<'a> {
    fn weight(&self, sample: usize) -> f64 {
        self.class_weight[usize::from(self.labels[sample])]
    }

    fn weighted_counts(&self, samples: &[usize]) -> (f64, f64) {
        samples.iter().fold((0.0, 0.0), |(pos, total), &s| {
            let w = self.weight(s);
            (pos + if self.labels[s] { w } else { 0.0 }, total + w)
        })
    }

    fn build(&mut self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let (pos, total) = self.weighted_counts(&samples);
        let probability = if total > 0.0 { pos / total } else { 0.0 };
        let node_index = self.nodes.len();
        self.nodes.push(Node::Leaf { probability });

        let depth_exhausted = self.params.max_depth.is_some_and(|max| depth >= max);
        let pure = pos <= 0.0 || pos >= total;
        if depth_exhausted
            || pure
            || samples.len() < self.params.min_samples_split
            || samples.len() < 2 * self.params.min_samples_leaf
        {
            return node_index;
        }

        let Some(split) = self.best_split(&samples, pos, total, rng) else {
            return node_index;
        };

        self.importances[split.feature] += split.gain;
        let left = self.build(split.left, depth + 1, rng);
        let right = self.build(split.right, depth + 1, rng);
        self.nodes[node_index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_index
    }

    fn best_split(
        &self,
        samples: &[usize],
        pos: f64,
        total: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let width = self.rows[0].len();
        let parent_impurity = total * gini(pos, total);
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut best: Option<(usize, f64, f64)> = None;
        let mut ordered: Vec<(f64, usize)> = Vec::with_capacity(samples.len());

        for feature in sample(rng, width, self.features_per_split) {
            ordered.clear();
            ordered.extend(samples.iter().map(|&s| (self.rows[s][feature], s)));
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            if ordered[0].0 == ordered[ordered.len() - 1].0 {
                continue;
            }

            let mut left_pos = 0.0;
            let mut left_total = 0.0;
            for i in 0..ordered.len() - 1 {
                let (value, s) = ordered[i];
                let w = self.weight(s);
                left_total += w;
                if self.labels[s] {
                    left_pos += w;
                }

                let next_value = ordered[i + 1].0;
                let left_count = i + 1;
                if value == next_value
                    || left_count < min_leaf
                    || ordered.len() - left_count < min_leaf
                {
                    continue;
                }

                let right_pos = pos - left_pos;
                let right_total = total - left_total;
                let gain = parent_impurity
                    - left_total * gini(left_pos, left_total)
                    - right_total * gini(right_pos, right_total);

                if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature, (value + next_value) / 2.0, gain));
                }
            }
        }

        let (feature, threshold, gain) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&s| self.rows[s][feature] <= threshold);

        Some(SplitCandidate {
            feature,
            threshold,
            gain,
            left,
            right,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Grow `n_estimators` trees, each on its own bootstrap sample.
    ///
    /// The same `seed` and inputs always produce the same forest.
    pub fn fit(params: &ForestParams, rows: &[&[f64]], labels: &[bool], seed: u64) -> Result<Self> {
        let width = rows
            .first()
            .map(|r| r.len())
            .ok_or_else(|| Error::classifier("cannot fit a forest on zero rows"))?;
        if rows.len() != labels.len() {
            return Err(Error::classifier("row and label counts differ"));
        }
        if width == 0 {
            return Err(Error::classifier("cannot fit a forest on zero-width rows"));
        }
        if params.n_estimators == 0 {
            return Err(Error::config("random forest needs at least one tree"));
        }

        let class_weight = if params.balanced {
            balanced_class_weights(labels)
        } else {
            [1.0, 1.0]
        };
        let features_per_split = params.max_features.resolve(width);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(params.n_estimators);
        let mut importances = vec![0.0; width];

        for _ in 0..params.n_estimators {
            let samples: Vec<usize> = if params.bootstrap {
                (0..rows.len()).map(|_| rng.gen_range(0..rows.len())).collect()
            } else {
                (0..rows.len()).collect()
            };

            let mut builder = TreeBuilder {
                params,
                rows,
                labels,
                class_weight,
                features_per_split,
                nodes: Vec::new(),
                importances: vec![0.0; width],
            };
            builder.build(samples, 0, &mut rng);

            let tree_total: f64 = builder.importances.iter().sum();
            if tree_total > 0.0 {
                for (acc, imp) in importances.iter_mut().zip(&builder.importances) {
                    *acc += imp / tree_total;
                }
            }
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        let grand_total: f64 = importances.iter().sum();
        if grand_total > 0.0 {
            for imp in &mut importances {
                *imp /= grand_total;
            }
        }

        Ok(Self { trees, importances })
    }

    /// Mean of the per-tree leaf probabilities for the distress class
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict_proba(row)).sum::<f64>() / self.trees.len() as f64
    }

    /// Check the structure of every tree, for forests read from disk
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::classifier("random forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| Error::classifier(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    /// Normalised mean impurity decrease per feature column
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}
