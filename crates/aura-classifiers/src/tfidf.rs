//! TF-IDF vectorizer with a vocabulary fixed at fit time

use crate::text::analyze;
use aura_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Vectorizer parameters. Keys missing from a config file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfConfig {
    /// Keep only the most frequent terms (by corpus count)
    pub max_features: Option<usize>,

    /// Minimum number of documents a term must appear in
    pub min_df: usize,

    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,

    /// Smallest n-gram length
    pub ngram_min: usize,

    /// Largest n-gram length
    pub ngram_max: usize,

    /// Remove English stop words before forming n-grams
    pub stop_words: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: Some(3000),
            min_df: 2,
            max_df: 0.8,
            ngram_min: 1,
            ngram_max: 2,
            stop_words: true,
        }
    }
}

impl TfidfConfig {
    /// Unigram settings for short-pattern similarity matching
    pub fn similarity_matching() -> Self {
        Self {
            max_features: Some(1000),
            min_df: 1,
            max_df: 1.0,
            ngram_min: 1,
            ngram_max: 1,
            stop_words: true,
        }
    }
}

/// Fitted TF-IDF vectorizer.
///
/// Term weights use smoothed IDF, `ln((1 + n) / (1 + df)) + 1`, and every
/// transformed row is L2-normalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights from `documents`
    pub fn fit<S: AsRef<str>>(config: TfidfConfig, documents: &[S]) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::classifier("cannot fit a vectorizer on zero documents"));
        }
        if config.ngram_min == 0 || config.ngram_min > config.ngram_max {
            return Err(Error::config(format!(
                "invalid n-gram range {}..={}",
                config.ngram_min, config.ngram_max
            )));
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut term_count: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = analyze(doc.as_ref(), config.stop_words, config.ngram_min, config.ngram_max);
            let mut seen = HashSet::new();
            for term in terms {
                *term_count.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        let n_docs = documents.len();
        let max_doc_count = (config.max_df * n_docs as f64).floor() as usize;

        let mut kept: Vec<(String, usize)> = term_count
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                df >= config.min_df && df <= max_doc_count
            })
            .collect();

        if let Some(limit) = config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(limit);
        }

        if kept.is_empty() {
            return Err(Error::classifier(
                "empty vocabulary: every term was pruned by min_df/max_df or stop words",
            ));
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = n_docs as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Ok(Self {
            config,
            vocabulary,
            idf,
        })
    }

    /// Weight `text` against the fitted vocabulary.
    ///
    /// Unknown terms are ignored; text with no known terms maps to all zeros.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut row = vec![0.0; self.idf.len()];
        let terms = analyze(
            text,
            self.config.stop_words,
            self.config.ngram_min,
            self.config.ngram_max,
        );
        for term in terms {
            if let Some(&index) = self.vocabulary.get(&term) {
                row[index] += 1.0;
            }
        }

        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut row {
                *value /= norm;
            }
        }
        row
    }

    /// Number of columns produced by `transform`
    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    /// Vocabulary terms in column order
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = vec![""; self.idf.len()];
        for (term, &index) in &self.vocabulary {
            names[index] = term.as_str();
        }
        names
    }
}

/// Dot product of two L2-normalised rows
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
