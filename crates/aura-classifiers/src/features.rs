//! Feature extraction: TF-IDF terms plus psychological-lexicon, social and
//! sentiment columns.
//!
//! The text columns come from a vectorizer fitted once at training time. The
//! 19 auxiliary columns are standardized with statistics captured from the
//! training partition; inference always reuses those statistics.

use crate::scaler::StandardScaler;
use crate::tfidf::{TfidfConfig, TfidfVectorizer};
use aura_core::Result;
use serde::{Deserialize, Serialize};

/// Psychological-lexicon columns, in vector order
pub const LEXICON_FEATURES: [&str; 15] = [
    "lex_liwc_negemo",
    "lex_liwc_anx",
    "lex_liwc_anger",
    "lex_liwc_sad",
    "lex_liwc_death",
    "lex_liwc_i",
    "lex_liwc_Tone",
    "lex_liwc_Authentic",
    "lex_liwc_affect",
    "lex_liwc_posemo",
    "lex_liwc_social",
    "lex_liwc_focuspast",
    "lex_liwc_cogproc",
    "lex_liwc_discrep",
    "lex_liwc_tentat",
];

/// Social-engagement columns, in vector order
pub const SOCIAL_FEATURES: [&str; 3] = ["social_karma", "social_num_comments", "social_upvote_ratio"];

pub const SENTIMENT_FEATURE: &str = "sentiment";

/// Width of the auxiliary block appended after the TF-IDF terms
pub const AUX_FEATURE_COUNT: usize = LEXICON_FEATURES.len() + SOCIAL_FEATURES.len() + 1;

/// Optional non-text inputs; anything not supplied stays 0.0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AuxFeatures {
    #[serde(default)]
    pub lexicon: [f64; 15],

    #[serde(default)]
    pub social: [f64; 3],

    #[serde(default)]
    pub sentiment: f64,
}

impl AuxFeatures {
    /// Column names in vector order
    pub fn names() -> impl Iterator<Item = &'static str> {
        LEXICON_FEATURES
            .into_iter()
            .chain(SOCIAL_FEATURES)
            .chain(std::iter::once(SENTIMENT_FEATURE))
    }

    /// Set a column by name. Returns false for unknown names.
    ///
    /// Non-finite values are stored as 0.0.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let value = if value.is_finite() { value } else { 0.0 };
        if let Some(i) = LEXICON_FEATURES.iter().position(|n| *n == name) {
            self.lexicon[i] = value;
        } else if let Some(i) = SOCIAL_FEATURES.iter().position(|n| *n == name) {
            self.social[i] = value;
        } else if name == SENTIMENT_FEATURE {
            self.sentiment = value;
        } else {
            return false;
        }
        true
    }

    /// Build from `(name, value)` pairs, ignoring unknown names
    pub fn from_named<K, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut aux = Self::default();
        for (name, value) in pairs {
            aux.set(name.as_ref(), value);
        }
        aux
    }

    pub fn to_vec(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(AUX_FEATURE_COUNT);
        values.extend_from_slice(&self.lexicon);
        values.extend_from_slice(&self.social);
        values.push(self.sentiment);
        values
    }
}

/// Raw input to feature extraction
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureRecord {
    pub text: String,
    pub aux: AuxFeatures,
}

impl FeatureRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            aux: AuxFeatures::default(),
        }
    }

    pub fn with_aux(mut self, aux: AuxFeatures) -> Self {
        self.aux = aux;
        self
    }
}

/// Fixed-width feature row. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fitted vectorizer and scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureExtractor {
    vectorizer: TfidfVectorizer,
    scaler: StandardScaler,
}

impl FeatureExtractor {
    /// Fit vocabulary and scaler on the training partition only
    pub fn fit(config: TfidfConfig, records: &[&FeatureRecord]) -> Result<Self> {
        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
        let vectorizer = TfidfVectorizer::fit(config, &texts)?;

        let aux_rows: Vec<Vec<f64>> = records.iter().map(|r| r.aux.to_vec()).collect();
        let scaler = StandardScaler::fit(&aux_rows)?;

        Ok(Self { vectorizer, scaler })
    }

    /// Build the feature row for one record
    pub fn extract(&self, record: &FeatureRecord) -> FeatureVector {
        self.extract_parts(&record.text, &record.aux)
    }

    pub fn extract_parts(&self, text: &str, aux: &AuxFeatures) -> FeatureVector {
        let mut row = self.vectorizer.transform(text);
        let mut numeric = aux.to_vec();
        self.scaler.transform_in_place(&mut numeric);
        row.extend(numeric);
        FeatureVector(row)
    }

    /// Total row width: vocabulary size plus the auxiliary block
    pub fn width(&self) -> usize {
        self.vectorizer.len() + self.scaler.width()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.len()
    }

    /// Column names in row order
    pub fn feature_names(&self) -> Vec<String> {
        self.vectorizer
            .feature_names()
            .into_iter()
            .map(str::to_string)
            .chain(AuxFeatures::names().map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FeatureRecord> {
        vec![
            FeatureRecord::new("I feel hopeless and alone")
                .with_aux(AuxFeatures::from_named([("lex_liwc_negemo", 4.0), ("sentiment", -0.6)])),
            FeatureRecord::new("hopeless nights, alone again")
                .with_aux(AuxFeatures::from_named([("lex_liwc_negemo", 2.0), ("sentiment", -0.2)])),
            FeatureRecord::new("great hike with friends")
                .with_aux(AuxFeatures::from_named([("lex_liwc_posemo", 3.0), ("sentiment", 0.8)])),
            FeatureRecord::new("friends made a great dinner")
                .with_aux(AuxFeatures::from_named([("lex_liwc_posemo", 1.0), ("sentiment", 0.4)])),
        ]
    }

    #[test]
    fn test_vector_width_is_fixed() {
        let records = records();
        let refs: Vec<&FeatureRecord> = records.iter().collect();
        let extractor = FeatureExtractor::fit(TfidfConfig::default(), &refs).unwrap();

        let short = extractor.extract(&FeatureRecord::new("hi"));
        let long = extractor.extract(&records[0]);
        assert_eq!(short.len(), extractor.width());
        assert_eq!(long.len(), extractor.width());
        assert_eq!(extractor.width(), extractor.vocabulary_size() + AUX_FEATURE_COUNT);
        assert_eq!(extractor.feature_names().len(), extractor.width());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let records = records();
        let refs: Vec<&FeatureRecord> = records.iter().collect();
        let extractor = FeatureExtractor::fit(TfidfConfig::default(), &refs).unwrap();

        for record in &records {
            assert_eq!(extractor.extract(record), extractor.extract(record));
        }
    }

    #[test]
    fn test_unknown_aux_names_are_ignored() {
        let aux = AuxFeatures::from_named([("not_a_feature", 9.0), ("social_karma", 12.0)]);
        assert_eq!(aux.social[0], 12.0);
        assert_eq!(aux.to_vec().iter().filter(|v| **v != 0.0).count(), 1);
    }

    #[test]
    fn test_non_finite_aux_defaults_to_zero() {
        let aux = AuxFeatures::from_named([("sentiment", f64::NAN)]);
        assert_eq!(aux.sentiment, 0.0);
    }
}
