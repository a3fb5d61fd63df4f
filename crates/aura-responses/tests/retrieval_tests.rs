//! Retrieval and local responder behaviour over realistic fixtures

use aura_core::{Category, ChatMode};
use aura_responses::{
    best_match, Corpus, CorpusEntry, LocalResponder, ReplyKind, CRISIS_RESPONSE,
    MIN_RESPONSE_CHARS,
};
use std::io::Write;
use tempfile::NamedTempFile;

const ANXIETY_REPLY: &str = "Exam anxiety is very common. Try breaking revision into short blocks \
                             and notice which thoughts make the worry spike.";
const GENERAL_REPLY: &str = "Thanks for reaching out. Tell me a little more about what is going on \
                             for you at the moment.";
const CRISIS_REPLY: &str = "I'm really glad you told me. Your safety matters most right now. Please \
                            contact a crisis line such as 988 or someone you trust.";

fn fixture_corpus() -> Corpus {
    Corpus::from_entries([
        CorpusEntry::new("Feeling nervous about exams and tests", GENERAL_REPLY)
            .with_categories([Category::General])
            .with_quality(60),
        CorpusEntry::new("Feeling anxious about upcoming tests", ANXIETY_REPLY).with_quality(60),
        CorpusEntry::new("I have thoughts of suicide", CRISIS_REPLY).with_quality(40),
    ])
}

#[test]
fn test_anxiety_entry_beats_general_entry() {
    let corpus = fixture_corpus();
    let reply = best_match("I'm feeling anxious about exams", &corpus);
    assert_eq!(reply, Some(ANXIETY_REPLY));
}

#[test]
fn test_crisis_entry_wins_for_crisis_message() {
    let corpus = fixture_corpus();
    let best = corpus.best_match("sometimes I think about suicide").unwrap();
    assert!(best.entry.categories.contains(&Category::Crisis));
    assert_eq!(best.entry.response, CRISIS_REPLY);
}

#[test]
fn test_top_matches_are_sorted_and_bounded() {
    let corpus = fixture_corpus();
    let top = corpus.top_matches("anxious and nervous about exams", 2);
    assert_eq!(top.len(), 2);
    assert!(top[0].score >= top[1].score);
    assert!(top.iter().all(|m| m.entry.response.chars().count() > MIN_RESPONSE_CHARS));
}

#[test]
fn test_corpus_loads_from_jsonl_file() {
    let mut file = NamedTempFile::with_suffix(".jsonl").unwrap();
    writeln!(
        file,
        r#"{{"Context": "I can't sleep since the breakup", "Response": "{GENERAL_REPLY}", "quality_score": 70}}"#
    )
    .unwrap();
    writeln!(file, r#"{{"context": "", "response": "dropped"}}"#).unwrap();

    let corpus = Corpus::from_path(file.path()).unwrap();
    assert_eq!(corpus.len(), 1);
    let entry = corpus.entries().next().unwrap();
    assert!(entry.categories.contains(&Category::Sleep));
    assert!(entry.categories.contains(&Category::Relationships));
}

#[test]
fn test_corpus_loads_from_csv_file() {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "Context,Response").unwrap();
    writeln!(file, "\"My mother died last month\",\"{GENERAL_REPLY}\"").unwrap();

    let corpus = Corpus::from_path(file.path()).unwrap();
    let entry = corpus.entries().next().unwrap();
    assert!(entry.categories.contains(&Category::Grief));
    assert!(entry.categories.contains(&Category::Family));
}

#[test]
fn test_missing_corpus_file_is_an_error() {
    assert!(Corpus::from_path("/definitely/not/here.json").is_err());
}

#[test]
fn test_local_responder_from_files() {
    let mut intents = NamedTempFile::with_suffix(".json").unwrap();
    write!(
        intents,
        r#"{{"intents": [{{"tag": "greeting", "patterns": ["Hello", "Hey there"], "responses": ["Hi! How are you doing today?"]}}]}}"#
    )
    .unwrap();

    let mut dialogue = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(dialogue, "User Input,Friend Mode Response,Professional Mode Response").unwrap();
    writeln!(
        dialogue,
        "I feel lonely at university,Uni can be so isolating. Want to talk about it?,Loneliness during transitions is common."
    )
    .unwrap();

    let responder = LocalResponder::from_paths(Some(intents.path()), Some(dialogue.path()), 0.3).unwrap();
    assert!(responder.has_patterns());

    let greeting = responder.reply("hello", ChatMode::Friend);
    assert_eq!(greeting.kind, ReplyKind::Intent);

    let lonely = responder.reply("so lonely at university", ChatMode::Professional);
    assert_eq!(lonely.kind, ReplyKind::Dialogue);
    assert_eq!(lonely.text, "Loneliness during transitions is common.");
}

#[test]
fn test_crisis_response_lists_helplines() {
    for needle in ["988", "741741", "14416", "1800-599-0019", "iasp.info"] {
        assert!(CRISIS_RESPONSE.contains(needle), "missing {needle}");
    }
}
