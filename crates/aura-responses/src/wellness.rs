//! Static wellness content: self-assessment, coping strategies, emotional
//! keyword replies, affirmations and crisis resources

use rand::seq::SliceRandom;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// A crisis line shown to users at risk
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Helpline {
    pub name: &'static str,
    pub contact: &'static str,
    pub region: &'static str,
}

pub const HELPLINES: [Helpline; 5] = [
    Helpline {
        name: "988 Suicide & Crisis Lifeline",
        contact: "Call or text 988",
        region: "US",
    },
    Helpline {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
        region: "US",
    },
    Helpline {
        name: "Tele MANAS",
        contact: "14416",
        region: "India",
    },
    Helpline {
        name: "KIRAN Mental Health Helpline",
        contact: "1800-599-0019",
        region: "India",
    },
    Helpline {
        name: "International Association for Suicide Prevention",
        contact: "https://www.iasp.info/resources/Crisis_Centres/",
        region: "International",
    },
];

/// Reply sent whenever the crisis override fires on the local path
pub const CRISIS_RESPONSE: &str = "I'm very concerned about what you've shared. Please know that \
you matter and there is help available right now.

IMMEDIATE HELP:
- 988 Suicide & Crisis Lifeline: call or text 988 (US)
- Crisis Text Line: text HOME to 741741 (US)
- Tele MANAS: 14416, KIRAN: 1800-599-0019 (India, 24/7)
- Find a local crisis centre: https://www.iasp.info/resources/Crisis_Centres/

Please reach out to one of these resources or go to your nearest emergency room. \
You don't have to face this alone.";

/// Helplines as bullet lines for prompts and messages
pub fn helpline_lines() -> String {
    HELPLINES
        .iter()
        .map(|h| format!("- {} ({}): {}", h.name, h.region, h.contact))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Anxiety,
    Depression,
    Stress,
    GeneralWellness,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Anxiety,
        StrategyKind::Depression,
        StrategyKind::Stress,
        StrategyKind::GeneralWellness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anxiety => "anxiety",
            Self::Depression => "depression",
            Self::Stress => "stress",
            Self::GeneralWellness => "general_wellness",
        }
    }
}

pub fn coping_strategies(kind: StrategyKind) -> &'static [&'static str] {
    match kind {
        StrategyKind::Anxiety => &[
            "Practice deep breathing: inhale for 4 counts, hold for 4, exhale for 4",
            "Try grounding: name 5 things you can see, 4 you can touch, 3 you can hear",
            "Take a short walk outside to calm your mind",
            "Write down your worries and challenge the negative thoughts",
            "Practice progressive muscle relaxation",
        ],
        StrategyKind::Depression => &[
            "Start with small, achievable goals each day",
            "Keep a regular sleep schedule",
            "Connect with someone you trust, even a brief conversation helps",
            "Do some light physical activity",
            "List three things you're thankful for",
        ],
        StrategyKind::Stress => &[
            "Break large tasks into smaller, manageable steps",
            "Take regular breaks during work",
            "Practice mindfulness meditation for 5-10 minutes",
            "Limit caffeine and alcohol",
            "Create a relaxing bedtime routine",
        ],
        StrategyKind::GeneralWellness => &[
            "Eat a balanced diet and stay hydrated",
            "Get regular exercise, even 20 minutes a day helps",
            "Practice good sleep hygiene",
            "Stay connected with friends and family",
            "Make time for hobbies you enjoy",
        ],
    }
}

/// Every strategy list keyed by its kind name
pub fn all_strategies() -> BTreeMap<&'static str, &'static [&'static str]> {
    StrategyKind::ALL
        .into_iter()
        .map(|k| (k.as_str(), coping_strategies(k)))
        .collect()
}

/// Canned reply for a recognised feeling word
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmotionalResponse {
    pub emotion: &'static str,
    pub response: &'static str,
    pub strategy: StrategyKind,
}

/// Checked in order; the first whole-word hit wins
pub const EMOTIONAL_RESPONSES: [EmotionalResponse; 13] = [
    EmotionalResponse {
        emotion: "sad",
        response: "I'm sorry to hear you're feeling sad. It's okay to feel this way. Would you like to talk about what's making you feel this way?",
        strategy: StrategyKind::Depression,
    },
    EmotionalResponse {
        emotion: "anxious",
        response: "I understand anxiety can be overwhelming. Let's take a moment to breathe together. Remember, you're not alone in this.",
        strategy: StrategyKind::Anxiety,
    },
    EmotionalResponse {
        emotion: "stressed",
        response: "Stress can feel like a heavy burden. Let's work together to find ways to lighten that load.",
        strategy: StrategyKind::Stress,
    },
    EmotionalResponse {
        emotion: "depressed",
        response: "I hear you, and your feelings are valid. Even small steps forward can make a difference.",
        strategy: StrategyKind::Depression,
    },
    EmotionalResponse {
        emotion: "worried",
        response: "Worry can consume our thoughts. Let's try to focus on what you can control right now.",
        strategy: StrategyKind::Anxiety,
    },
    EmotionalResponse {
        emotion: "overwhelmed",
        response: "It's okay to feel overwhelmed. Let's break things down into smaller, manageable pieces.",
        strategy: StrategyKind::Stress,
    },
    EmotionalResponse {
        emotion: "lonely",
        response: "Loneliness can be incredibly difficult. Reaching out, even to me, is a positive step.",
        strategy: StrategyKind::Depression,
    },
    EmotionalResponse {
        emotion: "hopeless",
        response: "I'm here for you. When things feel hopeless, please know that feelings are temporary and help is available.",
        strategy: StrategyKind::Depression,
    },
    EmotionalResponse {
        emotion: "happy",
        response: "That's wonderful to hear! What's contributing to your happiness?",
        strategy: StrategyKind::GeneralWellness,
    },
    EmotionalResponse {
        emotion: "good",
        response: "I'm glad you're feeling good! Let's keep that momentum going.",
        strategy: StrategyKind::GeneralWellness,
    },
    EmotionalResponse {
        emotion: "angry",
        response: "Anger is a natural emotion. Let's find healthy ways to express and process what you're feeling.",
        strategy: StrategyKind::Stress,
    },
    EmotionalResponse {
        emotion: "scared",
        response: "Fear can be paralyzing. You're brave for sharing this. Let's work through it together.",
        strategy: StrategyKind::Anxiety,
    },
    EmotionalResponse {
        emotion: "tired",
        response: "Fatigue affects both our mental and physical well-being. Let's explore what might be draining your energy.",
        strategy: StrategyKind::GeneralWellness,
    },
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w+\b").expect("static word pattern is valid"))
}

/// First emotional keyword present in `text`, in table order
pub fn detect_emotion(text: &str) -> Option<&'static EmotionalResponse> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = word_pattern().find_iter(&lowered).map(|m| m.as_str()).collect();
    EMOTIONAL_RESPONSES
        .iter()
        .find(|e| words.contains(&e.emotion))
}

pub const AFFIRMATIONS: [&str; 10] = [
    "You are worthy of love and kindness.",
    "Every day is a new opportunity for growth.",
    "Your feelings are valid and important.",
    "You have the strength to overcome challenges.",
    "It's okay to take things one step at a time.",
    "You are not alone in your journey.",
    "Small progress is still progress.",
    "You deserve peace and happiness.",
    "Your best is always good enough.",
    "Today, you choose to be gentle with yourself.",
];

pub fn random_affirmation() -> &'static str {
    AFFIRMATIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(AFFIRMATIONS[0])
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Scale { min: u8, max: u8 },
    Choice { options: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AssessmentQuestion {
    pub id: u8,
    pub question: &'static str,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

pub const ASSESSMENT_QUESTIONS: [AssessmentQuestion; 5] = [
    AssessmentQuestion {
        id: 1,
        question: "How would you rate your mood today on a scale of 1-10?",
        kind: QuestionKind::Scale { min: 1, max: 10 },
    },
    AssessmentQuestion {
        id: 2,
        question: "How well did you sleep last night?",
        kind: QuestionKind::Choice {
            options: &["Very Poor", "Poor", "Average", "Good", "Excellent"],
        },
    },
    AssessmentQuestion {
        id: 3,
        question: "Have you been feeling anxious or worried lately?",
        kind: QuestionKind::Choice {
            options: &["Not at all", "A little", "Moderately", "Quite a bit", "Extremely"],
        },
    },
    AssessmentQuestion {
        id: 4,
        question: "How often do you feel overwhelmed by your responsibilities?",
        kind: QuestionKind::Choice {
            options: &["Never", "Rarely", "Sometimes", "Often", "Always"],
        },
    },
    AssessmentQuestion {
        id: 5,
        question: "Have you lost interest in activities you used to enjoy?",
        kind: QuestionKind::Choice {
            options: &["Not at all", "A little", "Moderately", "Quite a bit", "Completely"],
        },
    },
];

/// Points per answer for questions 2-5, in option order
const CHOICE_POINTS: [(&str, [u32; 5]); 4] = [
    ("2", [0, 5, 10, 15, 20]),
    ("3", [20, 15, 10, 5, 0]),
    ("4", [15, 12, 9, 5, 0]),
    ("5", [15, 12, 9, 5, 0]),
];

pub const ASSESSMENT_MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Excellent,
    Good,
    Moderate,
    Concerning,
    NeedsAttention,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub score: u32,
    pub max_score: u32,
    pub status: AssessmentStatus,
    pub message: &'static str,
    pub strategies: Vec<&'static str>,
}

fn mood_points(answer: &Value) -> Option<u32> {
    let mood = match answer {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    mood.is_finite().then(|| (mood.round().clamp(0.0, 10.0) as u32) * 3)
}

/// Score answers keyed by question id ("1" to "5").
///
/// Question 1 is worth up to 30 points, the rest up to 20 or 15 each.
/// Unknown or unparseable answers score nothing.
pub fn analyze_assessment(answers: &HashMap<String, Value>) -> AssessmentResult {
    let mut score = answers.get("1").and_then(mood_points).unwrap_or(0);

    for (id, points) in CHOICE_POINTS {
        let Some(answer) = answers.get(id).and_then(Value::as_str) else {
            continue;
        };
        let options = ASSESSMENT_QUESTIONS
            .iter()
            .find(|q| q.id.to_string() == id)
            .and_then(|q| match q.kind {
                QuestionKind::Choice { options } => Some(options),
                QuestionKind::Scale { .. } => None,
            })
            .unwrap_or(&[]);
        if let Some(pos) = options.iter().position(|o| *o == answer) {
            score += points[pos];
        }
    }

    let (status, message, strategies) = if score >= 80 {
        (
            AssessmentStatus::Excellent,
            "Your mental health appears to be in a good place! Keep up the healthy habits.",
            coping_strategies(StrategyKind::GeneralWellness).to_vec(),
        )
    } else if score >= 60 {
        (
            AssessmentStatus::Good,
            "You're doing well overall. Here are some tips to maintain your mental wellness.",
            coping_strategies(StrategyKind::GeneralWellness).to_vec(),
        )
    } else if score >= 40 {
        (
            AssessmentStatus::Moderate,
            "You may be experiencing some stress or mild difficulties. Here are some coping strategies.",
            coping_strategies(StrategyKind::Stress).to_vec(),
        )
    } else if score >= 20 {
        let mut strategies = coping_strategies(StrategyKind::Anxiety).to_vec();
        strategies.extend_from_slice(&coping_strategies(StrategyKind::Depression)[..2]);
        (
            AssessmentStatus::Concerning,
            "It seems like you might be going through a challenging time. Please consider these resources.",
            strategies,
        )
    } else {
        (
            AssessmentStatus::NeedsAttention,
            "I'm concerned about your well-being. Please reach out to a mental health professional.",
            coping_strategies(StrategyKind::Depression).to_vec(),
        )
    };

    AssessmentResult {
        score,
        max_score: ASSESSMENT_MAX_SCORE,
        status,
        message,
        strategies,
    }
}
