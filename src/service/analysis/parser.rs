//! Parsing of model responses into per-category verdicts
//!
//! Responses are JSON by contract but arrive as raw text, and models wrap
//! them in code fences or prose often enough that cleanup runs first. Any
//! response this module cannot turn into at least one recognized verdict is
//! a typed error, so a bad chunk is counted as failed rather than silently
//! treated as all clear.

use std::collections::HashMap;

use serde::Deserialize;

use crate::model::{Category, Confidence, Polarity, Verdict};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Response contains no JSON object")]
    MissingJson,

    #[error("Failed to decode verdict JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response JSON contains no recognized categories")]
    NoCategories,
}

/// Verdict record as the model writes it, before token normalization
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    verdict: String,
    #[serde(default)]
    confidence: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    examples: Vec<String>,
}

impl RawVerdict {
    fn into_verdict(self) -> Verdict {
        // Unrecognized tokens degrade toward caution instead of failing the chunk
        let polarity = Polarity::parse_relaxed(&self.verdict).unwrap_or(Polarity::Maybe);
        let confidence = self
            .confidence
            .as_deref()
            .and_then(Confidence::parse_relaxed)
            .unwrap_or(Confidence::Low);

        Verdict {
            polarity,
            confidence,
            reasoning: self.reasoning.unwrap_or_default(),
            examples: self
                .examples
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }
}

/// Parse one model response into verdicts keyed by category.
///
/// Unrecognized category keys and malformed per-category records are logged
/// and skipped; the chunk fails only when nothing usable remains. Keys fold
/// in deterministic map order, so several keys resolving to one category
/// always leave the same record.
pub fn parse_verdicts(raw: &str) -> Result<HashMap<Category, Verdict>, ParseError> {
    let json = extract_json(raw).ok_or(ParseError::MissingJson)?;
    let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

    let mut verdicts = HashMap::new();
    for (key, value) in entries {
        let Some(category) = Category::from_label_relaxed(&key) else {
            tracing::warn!(key = %key, "Unrecognized category in model response, skipping");
            continue;
        };

        match serde_json::from_value::<RawVerdict>(value) {
            Ok(raw_verdict) => {
                if verdicts.insert(category, raw_verdict.into_verdict()).is_some() {
                    tracing::warn!(
                        category = %category,
                        "Several response keys resolve to one category, keeping the last record"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    error = %e,
                    "Malformed verdict record in model response, skipping"
                );
            }
        }
    }

    if verdicts.is_empty() {
        return Err(ParseError::NoCategories);
    }
    Ok(verdicts)
}

/// Slice the response down to its outermost JSON object, shedding code
/// fences and any prose around it
fn extract_json(raw: &str) -> Option<&str> {
    let text = strip_code_fences(raw.trim());
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start > end {
        return None;
    }
    Some(&text[start..=end])
}

fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
