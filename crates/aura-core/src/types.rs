//! Core types for Aura

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Positive-class probability at or above which distress is rated high
pub const HIGH_SEVERITY_THRESHOLD: f64 = 0.8;

/// Positive-class probability at or above which distress is rated medium
pub const MEDIUM_SEVERITY_THRESHOLD: f64 = 0.6;

/// Positive-class probability above which crisis intervention is requested
pub const CRISIS_PROBABILITY_THRESHOLD: f64 = 0.85;

/// Severity band of a distress prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Band the positive-class probability of a prediction already judged distress
    pub fn from_distress_probability(probability: f64) -> Self {
        if probability >= HIGH_SEVERITY_THRESHOLD {
            Self::High
        } else if probability >= MEDIUM_SEVERITY_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of distress detection for a single message.
///
/// Built per call and never persisted. When `requires_crisis_intervention`
/// comes from the keyword override, `is_distress` is true and `confidence`
/// is exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistressPrediction {
    /// Whether the predicted class is "distress"
    pub is_distress: bool,

    /// Probability mass on the predicted class (0.0-1.0)
    pub confidence: f64,

    /// Probability of the distress class (0.0-1.0)
    #[serde(rename = "distress_probability")]
    pub probability: f64,

    /// Severity band; `None` unless the predicted class is distress
    pub severity: Severity,

    /// Whether the reply should route the user to crisis resources
    pub requires_crisis_intervention: bool,
}

impl DistressPrediction {
    /// Derive a prediction from the classifier's distress-class probability.
    ///
    /// The predicted class is the argmax of `[1 - p, p]`; an exact tie goes
    /// to the non-distress class.
    pub fn from_probability(probability: f64) -> Self {
        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let is_distress = probability > 1.0 - probability;
        let confidence = probability.max(1.0 - probability);
        let severity = if is_distress {
            Severity::from_distress_probability(probability)
        } else {
            Severity::None
        };

        Self {
            is_distress,
            confidence,
            probability,
            severity,
            requires_crisis_intervention: probability > CRISIS_PROBABILITY_THRESHOLD,
        }
    }

    /// The prediction forced by a crisis keyword match
    pub fn crisis_override() -> Self {
        Self {
            is_distress: true,
            confidence: 1.0,
            probability: 1.0,
            severity: Severity::High,
            requires_crisis_intervention: true,
        }
    }

    /// Merge a classifier outcome with the keyword scan.
    ///
    /// A keyword match always wins, including when the classifier produced
    /// nothing at all.
    pub fn merge(classifier: Option<Self>, crisis_keyword_matched: bool) -> Option<Self> {
        if crisis_keyword_matched {
            Some(Self::crisis_override())
        } else {
            classifier
        }
    }
}

/// Conversation style requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Friend,
    Professional,
}

impl ChatMode {
    pub const ALL: [ChatMode; 2] = [ChatMode::Friend, ChatMode::Professional];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::Professional => "professional",
        }
    }

    /// Human-readable mode name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Friend => "Friend Mode",
            Self::Professional => "Professional Mode",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Friend => "Casual, supportive conversations",
            Self::Professional => "Professional therapeutic guidance",
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "friend" => Ok(Self::Friend),
            "professional" => Ok(Self::Professional),
            other => Err(format!("unknown chat mode: {other}")),
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a chat reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    CounselingDataset,
    Gemini,
    TrainedModel,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CounselingDataset => "counseling_dataset",
            Self::Gemini => "gemini",
            Self::TrainedModel => "trained_model",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of counseling topics shared by the corpus and the retriever
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Crisis,
    Depression,
    Anxiety,
    Trauma,
    Relationships,
    Family,
    SelfEsteem,
    Grief,
    Sleep,
    General,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Crisis,
        Category::Depression,
        Category::Anxiety,
        Category::Trauma,
        Category::Relationships,
        Category::Family,
        Category::SelfEsteem,
        Category::Grief,
        Category::Sleep,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crisis => "crisis",
            Self::Depression => "depression",
            Self::Anxiety => "anxiety",
            Self::Trauma => "trauma",
            Self::Relationships => "relationships",
            Self::Family => "family",
            Self::SelfEsteem => "self-esteem",
            Self::Grief => "grief",
            Self::Sleep => "sleep",
            Self::General => "general",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
