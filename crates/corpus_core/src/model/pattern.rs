//! Writing-style pattern records.

use serde::Serialize;

/// Pattern family a regex group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// How an argument is developed.
    Logical,
    /// How feelings are expressed.
    Emotional,
    /// How a post is laid out.
    Structural,
}

impl PatternType {
    pub const ALL: [PatternType; 3] = [
        PatternType::Logical,
        PatternType::Emotional,
        PatternType::Structural,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PatternType::Logical => "logical",
            PatternType::Emotional => "emotional",
            PatternType::Structural => "structural",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "logical" => Some(PatternType::Logical),
            "emotional" => Some(PatternType::Emotional),
            "structural" => Some(PatternType::Structural),
            _ => None,
        }
    }
}

/// Aggregated occurrences of one named pattern across the analyzed corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WritingPattern {
    pub pattern_type: PatternType,
    pub pattern_name: String,
    /// Alternation of the regex sources that make up this pattern.
    pub pattern: String,
    /// Matched contexts, unique, in first-seen order.
    pub examples: Vec<String>,
    pub occurrences: u32,
}
