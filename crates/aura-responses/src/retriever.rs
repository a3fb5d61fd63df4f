//! Scored retrieval over the counseling corpus
//!
//! An entry's score against a message is
//!
//! ```text
//! 30 * shared categories
//! + 15 * category keywords present in both message and context
//! +  2 * distinct content words shared with the context
//! + 0.2 * quality_score
//! + 50 if both sides are tagged crisis
//! ```
//!
//! Category agreement dominates. Overlap and quality only break near-ties.

use crate::category::{categories_for_keywords, matched_keywords};
use crate::corpus::{Corpus, CorpusEntry, IndexedEntry};
use aura_core::Category;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

pub const CATEGORY_WEIGHT: f64 = 30.0;
pub const KEYWORD_WEIGHT: f64 = 15.0;
pub const OVERLAP_WEIGHT: f64 = 2.0;
pub const QUALITY_WEIGHT: f64 = 0.2;
pub const CRISIS_BONUS: f64 = 50.0;

/// Responses this short or shorter are never returned
pub const MIN_RESPONSE_CHARS: usize = 50;

const OVERLAP_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "you", "your", "yours", "he", "him", "his",
    "she", "her", "hers", "it", "its", "they", "them", "the", "a", "an", "and", "or", "but", "in",
    "on", "at", "to", "for", "of", "with", "by", "from", "as", "is", "was", "are", "were", "been",
    "be", "have", "has", "had", "do", "does", "did", "will", "would", "could", "should", "that",
    "this", "these", "those", "am", "can", "what", "how",
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w+\b").expect("static word pattern is valid"))
}

/// Distinct lower-cased words longer than three characters, minus stop words
pub fn overlap_tokens(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 3 && !OVERLAP_STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Pre-analyzed user message
#[derive(Debug, Clone)]
pub struct Query {
    pub categories: BTreeSet<Category>,
    pub keywords: BTreeSet<&'static str>,
    tokens: HashSet<String>,
}

impl Query {
    pub fn new(message: &str) -> Self {
        let keywords = matched_keywords(message);
        Self {
            categories: categories_for_keywords(&keywords),
            keywords,
            tokens: overlap_tokens(message),
        }
    }

    pub fn is_crisis(&self) -> bool {
        self.categories.contains(&Category::Crisis)
    }
}

/// A corpus entry with its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch<'a> {
    pub entry: &'a CorpusEntry,
    pub score: f64,

    /// Position in the corpus
    pub index: usize,
}

fn score(query: &Query, indexed: &IndexedEntry) -> f64 {
    let entry = &indexed.entry;
    let shared_categories = query.categories.intersection(&entry.categories).count();
    let shared_keywords = query.keywords.intersection(&indexed.keywords).count();
    let overlap = query.tokens.intersection(&indexed.tokens).count();

    let mut score = CATEGORY_WEIGHT * shared_categories as f64
        + KEYWORD_WEIGHT * shared_keywords as f64
        + OVERLAP_WEIGHT * overlap as f64
        + QUALITY_WEIGHT * f64::from(entry.quality_score);
    if query.is_crisis() && entry.categories.contains(&Category::Crisis) {
        score += CRISIS_BONUS;
    }
    score
}

impl Corpus {
    /// Score every eligible entry against `query`, in corpus order
    pub fn score_all<'a>(&'a self, query: &Query) -> Vec<ScoredMatch<'a>> {
        self.indexed()
            .iter()
            .enumerate()
            .filter(|(_, indexed)| indexed.response_chars > MIN_RESPONSE_CHARS)
            .map(|(index, indexed)| ScoredMatch {
                entry: &indexed.entry,
                score: score(query, indexed),
                index,
            })
            .collect()
    }

    /// Highest-scoring entry; the earliest wins a tie, and nothing scoring
    /// zero or less is returned
    pub fn best_match(&self, message: &str) -> Option<ScoredMatch<'_>> {
        let query = Query::new(message);
        self.score_all(&query)
            .into_iter()
            .filter(|m| m.score > 0.0)
            .fold(None, |best: Option<ScoredMatch<'_>>, m| match best {
                Some(b) if b.score >= m.score => Some(b),
                _ => Some(m),
            })
    }

    /// Up to `k` entries by descending score, ties kept in corpus order
    pub fn top_matches(&self, message: &str, k: usize) -> Vec<ScoredMatch<'_>> {
        let query = Query::new(message);
        let mut matches: Vec<ScoredMatch<'_>> = self
            .score_all(&query)
            .into_iter()
            .filter(|m| m.score > 0.0)
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(k);
        matches
    }
}

/// Best response text for `message`, if any entry scores above zero
pub fn best_match<'a>(message: &str, corpus: &'a Corpus) -> Option<&'a str> {
    corpus.best_match(message).map(|m| m.entry.response.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "That sounds really hard. Would you like to talk through what is on your mind?";

    #[test]
    fn test_overlap_tokens() {
        let tokens = overlap_tokens("I have been feeling SO tired and tired, what should I do");
        assert_eq!(
            tokens,
            HashSet::from(["feeling".to_string(), "tired".to_string()])
        );
    }

    #[test]
    fn test_weights_add_up() {
        let corpus = Corpus::from_entries([CorpusEntry::new(
            "I feel anxious and worried before exams",
            LONG,
        )
        .with_quality(50)]);
        let query = Query::new("so anxious about exams");
        let scored = corpus.score_all(&query);

        // anxiety shared (30) + "anxious" (15) + "anxious","exams" (4) + quality (10)
        assert_eq!(scored[0].score, 30.0 + 15.0 + 4.0 + 10.0);
    }

    #[test]
    fn test_crisis_bonus() {
        let corpus = Corpus::from_entries([CorpusEntry::new("thoughts of suicide", LONG)]);
        let scored = corpus.score_all(&Query::new("I think about suicide"));
        // crisis shared (30) + "suicide" (15) + "suicide" overlap (2) + bonus (50)
        assert_eq!(scored[0].score, 97.0);
    }

    #[test]
    fn test_nested_keyword_still_counts() {
        let corpus = Corpus::from_entries([CorpusEntry::new("my sleep is broken", LONG)]);
        let scored = corpus.score_all(&Query::new("I can't sleep"));
        // sleep shared (30) + "sleep" in both (15) + "sleep" overlap (2)
        assert_eq!(scored[0].score, 47.0);
    }

    #[test]
    fn test_word_forms_keep_category_weight() {
        let corpus = Corpus::from_entries([
            CorpusEntry::new("Feeling down about school", format!("{LONG} General.")).with_quality(100),
            CorpusEntry::new("Stress before exams", LONG),
        ]);
        let best = corpus.best_match("exams are so stressful").unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn test_short_responses_are_never_returned() {
        let corpus = Corpus::from_entries([
            CorpusEntry::new("I feel anxious", "Breathe.").with_quality(100),
            CorpusEntry::new("I feel lost", LONG),
        ]);
        let best = corpus.best_match("I feel anxious").unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn test_ties_go_to_corpus_order() {
        let corpus = Corpus::from_entries([
            CorpusEntry::new("feeling anxious", LONG),
            CorpusEntry::new("feeling anxious", format!("{LONG} Second.")),
        ]);
        assert_eq!(corpus.best_match("anxious feeling").unwrap().index, 0);

        let top = corpus.top_matches("anxious feeling", 5);
        assert_eq!(top.iter().map(|m| m.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_no_positive_score_returns_none() {
        let corpus = Corpus::from_entries([CorpusEntry::new("relationship advice", LONG)
            .with_categories([Category::Relationships])]);
        assert!(best_match("hello", &corpus).is_none());
        assert!(best_match("anything", &Corpus::default()).is_none());
    }
}
