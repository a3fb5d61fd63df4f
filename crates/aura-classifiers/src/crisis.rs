//! Crisis keyword override
//!
//! A deterministic phrase scan that runs before any statistical model. A
//! match forces a high-severity distress prediction no matter what the
//! classifier says, or whether it ran at all.

use aho_corasick::{AhoCorasick, MatchKind};
use aura_core::{DistressPrediction, Error, Result};

/// High-specificity phrases that signal risk of self-harm
pub const CRISIS_PHRASES: [&str; 18] = [
    "kill myself",
    "end my life",
    "want to die",
    "hurt myself",
    "no reason to live",
    "suicide",
    "suicidal",
    "better off dead",
    "end it all",
    "take my life",
    "don't want to live",
    "not worth living",
    "can't go on",
    "self harm",
    "self-harm",
    "cut myself",
    "harm myself",
    "overdose",
];

/// Phrases found by a scan, in order of appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrisisScan {
    pub matched: Vec<String>,
}

impl CrisisScan {
    pub fn is_crisis(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Case-insensitive substring scanner over a fixed phrase list
pub struct CrisisDetector {
    phrases: Vec<String>,
    matcher: AhoCorasick,
}

impl CrisisDetector {
    /// Detector over the built-in phrase list
    pub fn new() -> Result<Self> {
        Self::with_phrases(CRISIS_PHRASES)
    }

    pub fn with_phrases<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&phrases)
            .map_err(|e| Error::classifier(format!("Failed to build crisis matcher: {e}")))?;

        Ok(Self { phrases, matcher })
    }

    /// True on the first phrase found
    pub fn detect_crisis(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.matcher.is_match(&normalize(text))
    }

    /// Every phrase found, for logging
    pub fn scan(&self, text: &str) -> CrisisScan {
        let normalized = normalize(text);
        let mut matched: Vec<String> = Vec::new();
        for m in self.matcher.find_iter(&normalized) {
            let phrase = &self.phrases[m.pattern().as_usize()];
            if !matched.contains(phrase) {
                matched.push(phrase.clone());
            }
        }
        CrisisScan { matched }
    }

    /// Apply the override to a classifier outcome
    pub fn apply(&self, text: &str, prediction: Option<DistressPrediction>) -> Option<DistressPrediction> {
        DistressPrediction::merge(prediction, self.detect_crisis(text))
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }
}

/// Lower-case and fold typographic apostrophes to ASCII
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}', '\u{02bc}'], "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_phrases_case_insensitively() {
        let detector = CrisisDetector::new().unwrap();
        assert!(detector.detect_crisis("I want to KILL MYSELF"));
        assert!(detector.detect_crisis("there is no reason to live anymore"));
        assert!(!detector.detect_crisis("I'm feeling anxious about exams"));
    }

    #[test]
    fn test_typographic_apostrophe() {
        let detector = CrisisDetector::new().unwrap();
        assert!(detector.detect_crisis("I don\u{2019}t want to live like this"));
        assert!(detector.detect_crisis("I CAN\u{2019}T GO ON"));
    }

    #[test]
    fn test_empty_input_is_not_crisis() {
        let detector = CrisisDetector::new().unwrap();
        assert!(!detector.detect_crisis(""));
        assert!(!detector.scan("").is_crisis());
    }

    #[test]
    fn test_scan_reports_each_phrase_once() {
        let detector = CrisisDetector::new().unwrap();
        let scan = detector.scan("suicide. I keep thinking about suicide and I want to die");
        assert_eq!(scan.matched, vec!["suicide", "want to die"]);
    }

    #[test]
    fn test_longest_phrase_wins() {
        let detector = CrisisDetector::new().unwrap();
        let scan = detector.scan("I have had suicidal thoughts");
        assert_eq!(scan.matched, vec!["suicidal"]);
    }

    #[test]
    fn test_override_beats_calm_prediction() {
        let detector = CrisisDetector::new().unwrap();
        let calm = DistressPrediction::from_probability(0.05);

        let merged = detector.apply("I want to end my life", Some(calm)).unwrap();
        assert!(merged.is_distress);
        assert_eq!(merged.confidence, 1.0);
        assert!(merged.requires_crisis_intervention);

        assert_eq!(detector.apply("lovely weather", Some(calm)), Some(calm));
    }
}
