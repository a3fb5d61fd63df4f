//! Counseling corpus ingestion
//!
//! Source files come in several shapes: a JSON array, JSON lines, or CSV,
//! with keys spelled `context`/`Context`/`text` and `response`/`Response`.
//! Everything is normalized into [`CorpusEntry`] here so the retriever only
//! ever sees one record type.

use crate::category::{detect_categories, matched_keywords};
use crate::retriever::overlap_tokens;
use aura_core::{Category, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// One counseling exchange. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub context: String,
    pub response: String,
    pub categories: BTreeSet<Category>,

    /// 0-100; entries without a score count as 0
    pub quality_score: u8,
}

impl CorpusEntry {
    /// Entry whose categories are derived from its context
    pub fn new(context: impl Into<String>, response: impl Into<String>) -> Self {
        let context = context.into();
        Self {
            categories: detect_categories(&context),
            context,
            response: response.into(),
            quality_score: 0,
        }
    }

    pub fn with_quality(mut self, quality_score: u8) -> Self {
        self.quality_score = quality_score.min(100);
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        if self.categories.is_empty() {
            self.categories.insert(Category::General);
        }
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCategories {
    List(Vec<String>),
    Text(String),
}

/// Legacy record shape accepted from disk
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default, alias = "Context", alias = "text", alias = "input", alias = "Input")]
    context: Option<String>,

    #[serde(default, alias = "Response", alias = "output", alias = "Output")]
    response: Option<String>,

    #[serde(default, alias = "Categories", alias = "category")]
    categories: Option<RawCategories>,

    #[serde(default, alias = "quality", alias = "Quality")]
    quality_score: Option<f64>,
}

impl RawEntry {
    fn normalize(self) -> Option<CorpusEntry> {
        let context = self.context?.trim().to_string();
        let response = self.response?.trim().trim_matches('"').trim().to_string();
        if context.is_empty() || response.is_empty() {
            return None;
        }

        let labels: Vec<String> = match self.categories {
            Some(RawCategories::List(list)) => list,
            Some(RawCategories::Text(text)) => text
                .split([',', ';', '|'])
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };
        let mut categories: BTreeSet<Category> = labels
            .iter()
            .filter_map(|label| Category::from_str(label).ok())
            .collect();
        if categories.is_empty() {
            categories = detect_categories(&context);
        }

        let quality_score = self
            .quality_score
            .filter(|q| q.is_finite())
            .map(|q| q.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);

        Some(CorpusEntry {
            context,
            response,
            categories,
            quality_score,
        })
    }
}

/// Entry plus the lookups the scorer needs, computed once at load
#[derive(Debug, Clone)]
pub(crate) struct IndexedEntry {
    pub(crate) entry: CorpusEntry,
    pub(crate) keywords: BTreeSet<&'static str>,
    pub(crate) tokens: HashSet<String>,
    pub(crate) response_chars: usize,
}

impl IndexedEntry {
    fn new(entry: CorpusEntry) -> Self {
        Self {
            keywords: matched_keywords(&entry.context),
            tokens: overlap_tokens(&entry.context),
            response_chars: entry.response.chars().count(),
            entry,
        }
    }
}

/// The static response corpus. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<IndexedEntry>,
}

impl Corpus {
    pub fn from_entries(entries: impl IntoIterator<Item = CorpusEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(IndexedEntry::new).collect(),
        }
    }

    /// Load a `.csv`, `.jsonl` or `.json` corpus file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        let raw = if is_csv {
            let file = std::fs::File::open(path)?;
            parse_csv(file)?
        } else {
            parse_json(&std::fs::read_to_string(path)?)?
        };

        let corpus = Self::from_raw(raw);
        info!(path = %path.display(), entries = corpus.len(), "Loaded counseling corpus");
        Ok(corpus)
    }

    /// Parse a JSON array or JSON-lines document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(Self::from_raw(parse_json(content)?))
    }

    fn from_raw(raw: Vec<RawEntry>) -> Self {
        let total = raw.len();
        let corpus = Self::from_entries(raw.into_iter().filter_map(RawEntry::normalize));
        let skipped = total - corpus.len();
        if skipped > 0 {
            warn!(skipped, "Skipped corpus rows without context or response");
        }
        corpus
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.iter().map(|e| &e.entry)
    }

    pub(crate) fn indexed(&self) -> &[IndexedEntry] {
        &self.entries
    }

    /// Number of entries tagged with each category
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.entries().filter(|e| e.categories.contains(&c)).count()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

fn parse_json(content: &str) -> Result<Vec<RawEntry>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let mut rows = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawEntry>(line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                return Err(Error::corpus(format!("line {}: {e}", line_no + 1)));
            }
        }
    }
    debug!(rows = rows.len(), "Parsed JSON-lines corpus");
    Ok(rows)
}

fn parse_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawEntry>> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    csv.deserialize()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| Error::corpus(format!("row {}: {e}", i + 2))))
        .collect()
}
