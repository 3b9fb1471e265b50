//! Verdict acceptance policies
//!
//! A parsed YES is not automatically a match. Models sometimes answer "YES"
//! while the reasoning says the opposite ("no instances of violence were
//! found"), and hedged answers inflate recall at the cost of precision. The
//! negation-aware policy is the default; the permissive one trusts the raw
//! verdict field and exists for callers that prefer recall.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Confidence, Polarity, Verdict};

/// Phrases that contradict a positive verdict when they lead the reasoning
const NEGATION_PHRASES: &[&str] = &[
    "not present",
    "no instances",
    "no instance",
    "does not contain",
    "does not depict",
    "not depicted",
    "no evidence",
    "no mention",
    "none found",
    "not found",
    "absent",
    "lacks",
    "free of",
    "nothing in the excerpt",
];

/// Hedging phrases that undercut a positive verdict
const UNCERTAINTY_PHRASES: &[&str] = &[
    "maybe",
    "unclear",
    "not sure",
    "possibly",
    "could be",
    "i don't know",
];

/// Characters of reasoning scanned for contradictions. Negations about the
/// verdict itself lead the reasoning; later sentences tend to discuss other
/// categories or context.
const REASONING_SCAN_CHARS: usize = 160;

static NEGATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| compile_phrases(NEGATION_PHRASES));
static UNCERTAINTY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| compile_phrases(UNCERTAINTY_PHRASES));

fn compile_phrases(phrases: &[&str]) -> Vec<Regex> {
    phrases
        .iter()
        .map(|phrase| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                .expect("static phrase pattern")
        })
        .collect()
}

/// Rule deciding whether a parsed YES counts as a positive match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptancePolicy {
    /// YES with at least MEDIUM confidence and no contradicting reasoning
    Conservative,
    /// Any YES counts
    Permissive,
}

impl AcceptancePolicy {
    pub fn accepts(&self, verdict: &Verdict) -> bool {
        if verdict.polarity != Polarity::Yes {
            return false;
        }

        match self {
            AcceptancePolicy::Permissive => true,
            AcceptancePolicy::Conservative => {
                if verdict.confidence.rank() < Confidence::Medium.rank() {
                    tracing::debug!(
                        confidence = ?verdict.confidence,
                        "Rejecting low-confidence positive verdict"
                    );
                    return false;
                }
                if let Some(phrase) = contradiction_phrase(&verdict.reasoning) {
                    tracing::debug!(
                        phrase = phrase,
                        "Rejecting positive verdict contradicted by its reasoning"
                    );
                    return false;
                }
                true
            }
        }
    }
}

/// First negation or uncertainty phrase in the head of the reasoning, if any
fn contradiction_phrase(reasoning: &str) -> Option<&'static str> {
    let head: String = reasoning.chars().take(REASONING_SCAN_CHARS).collect();

    for (phrase, pattern) in NEGATION_PHRASES.iter().zip(NEGATION_PATTERNS.iter()) {
        if pattern.is_match(&head) {
            return Some(phrase);
        }
    }
    for (phrase, pattern) in UNCERTAINTY_PHRASES.iter().zip(UNCERTAINTY_PATTERNS.iter()) {
        if pattern.is_match(&head) {
            return Some(phrase);
        }
    }
    None
}
