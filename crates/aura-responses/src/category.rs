//! Topical category detection from fixed keyword lists

use aho_corasick::{AhoCorasick, MatchKind};
use aura_core::Category;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Keywords that place a message in each category. `General` has none; it
/// is what a message gets when nothing else matches.
pub fn keywords_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Crisis => &["suicide", "suicidal", "kill myself", "end it", "die", "death"],
        Category::Depression => &["depressed", "depression", "sad", "worthless", "hopeless"],
        Category::Anxiety => &[
            "anxious", "anxiety", "panic", "worried", "worry", "stress", "stressed", "nervous",
        ],
        Category::Trauma => &["trauma", "abuse", "abused", "ptsd", "assault"],
        Category::Relationships => &[
            "relationship", "marriage", "partner", "divorce", "breakup", "boyfriend", "girlfriend",
        ],
        Category::Family => &["family", "parent", "parents", "child", "sibling", "mother", "father"],
        Category::SelfEsteem => &["self esteem", "self-esteem", "confidence", "worth", "insecure"],
        Category::Grief => &["grief", "loss", "death", "died", "grieving"],
        Category::Sleep => &["sleep", "insomnia", "nightmare", "nightmares", "can't sleep"],
        Category::General => &[],
    }
}

struct KeywordIndex {
    matcher: AhoCorasick,
    keywords: Vec<&'static str>,
}

fn index() -> &'static KeywordIndex {
    static INDEX: OnceLock<KeywordIndex> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut keywords: Vec<&'static str> = Category::ALL
            .into_iter()
            .flat_map(keywords_for)
            .copied()
            .collect();
        keywords.sort_unstable();
        keywords.dedup();

        // Standard match kind so overlapping hits ("can't sleep", "sleep") all report
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&keywords)
            .expect("static keyword patterns are valid");

        KeywordIndex { matcher, keywords }
    })
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Every category keyword that occurs anywhere in `text`, overlaps included.
/// Matching is by substring, so "stressful" carries "stress".
pub fn matched_keywords(text: &str) -> BTreeSet<&'static str> {
    let index = index();
    let normalized = normalize(text);
    index
        .matcher
        .find_overlapping_iter(&normalized)
        .map(|m| index.keywords[m.pattern().as_usize()])
        .collect()
}

/// Categories whose keyword lists intersect `keywords`
pub fn categories_for_keywords(keywords: &BTreeSet<&'static str>) -> BTreeSet<Category> {
    let mut categories: BTreeSet<Category> = Category::ALL
        .into_iter()
        .filter(|c| keywords_for(*c).iter().any(|k| keywords.contains(k)))
        .collect();
    if categories.is_empty() {
        categories.insert(Category::General);
    }
    categories
}

/// Topical categories of `text`; `{General}` when no keyword matches
pub fn detect_categories(text: &str) -> BTreeSet<Category> {
    categories_for_keywords(&matched_keywords(text))
}
