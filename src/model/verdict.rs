//! Per-chunk verdict types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Whether the model judged a category to be present in a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Yes,
    No,
    Maybe,
}

impl Polarity {
    /// Parse a verdict token leniently ("yes", "Yes.", "NO", "maybe").
    /// Unrecognized tokens return `None`; callers downgrade them to `Maybe`.
    pub fn parse_relaxed(raw: &str) -> Option<Polarity> {
        match fold_token(raw).as_str() {
            "yes" => Some(Polarity::Yes),
            "no" => Some(Polarity::No),
            "maybe" | "uncertain" | "unknown" => Some(Polarity::Maybe),
            _ => None,
        }
    }
}

/// Model-reported confidence in a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Rank for comparisons (higher is more confident)
    pub fn rank(&self) -> u8 {
        match self {
            Confidence::Low => 0,
            Confidence::Medium => 1,
            Confidence::High => 2,
        }
    }

    /// Parse a confidence token leniently ("HIGH", "med", "Low").
    /// Unrecognized tokens return `None`; callers downgrade them to `Low`.
    pub fn parse_relaxed(raw: &str) -> Option<Confidence> {
        match fold_token(raw).as_str() {
            "low" => Some(Confidence::Low),
            "medium" | "med" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

/// One model judgment for a (chunk, category) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Verdict {
    pub polarity: Polarity,
    pub confidence: Confidence,
    /// Free-text justification from the model
    pub reasoning: String,
    /// Short quotes from the chunk that support the verdict
    pub examples: Vec<String>,
}

/// Lowercase and strip surrounding punctuation and whitespace
fn fold_token(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase()
}
