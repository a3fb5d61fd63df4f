//! Aura Responses
//!
//! Everything that turns a message into reply text without calling a
//! hosted model:
//!
//! - [`Corpus`] and [`best_match`]: scored retrieval over counseling
//!   exchanges, ranked by shared category, keywords and word overlap
//! - [`LocalResponder`]: stemmed TF-IDF matching over dialogue rows and
//!   intent patterns, with emotional-keyword and generic fallbacks
//! - [`wellness`]: self-assessment scoring, coping strategies,
//!   affirmations and crisis helplines

pub mod category;
pub mod corpus;
pub mod local;
pub mod retriever;
pub mod wellness;

pub use category::{detect_categories, keywords_for, matched_keywords};
pub use corpus::{Corpus, CorpusEntry};
pub use local::{Intent, DialogueRow, LocalReply, LocalResponder, ReplyKind};
pub use retriever::{best_match, Query, ScoredMatch, MIN_RESPONSE_CHARS};
pub use wellness::{AssessmentResult, AssessmentStatus, CRISIS_RESPONSE, HELPLINES};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::corpus::{Corpus, CorpusEntry};
    pub use crate::local::{LocalReply, LocalResponder};
    pub use crate::retriever::best_match;
    pub use crate::wellness::CRISIS_RESPONSE;
}
