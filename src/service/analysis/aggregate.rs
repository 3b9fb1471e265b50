//! Aggregation of per-chunk verdicts into per-category results

use std::collections::HashMap;

use crate::model::{Category, CategoryResult, CategoryStatus, Confidence, Verdict};
use crate::service::analysis::acceptance::AcceptancePolicy;
use crate::service::analysis::error::ChunkFailure;

/// Evidence snippets kept per category
pub const MAX_EVIDENCE: usize = 3;

/// What one chunk contributed to the document
#[derive(Debug)]
pub enum ChunkOutcome {
    Verdicts(HashMap<Category, Verdict>),
    Failed(ChunkFailure),
}

/// Fold chunk outcomes into one result per category.
///
/// The result list covers every category exactly once, in canonical order,
/// even when no chunk mentioned it. Failed chunks stay in the denominator so
/// partial failure shows up as a lower match ratio instead of disappearing.
pub fn fold_outcomes(outcomes: &[ChunkOutcome], policy: AcceptancePolicy) -> Vec<CategoryResult> {
    let total_chunks = outcomes.len();

    Category::ALL
        .iter()
        .map(|&category| {
            let mut matched_chunks = 0usize;
            let mut best: Option<Confidence> = None;
            let mut evidence: Vec<String> = Vec::new();

            for outcome in outcomes {
                let ChunkOutcome::Verdicts(verdicts) = outcome else {
                    continue;
                };
                let Some(verdict) = verdicts.get(&category) else {
                    continue;
                };
                if !policy.accepts(verdict) {
                    continue;
                }

                matched_chunks += 1;
                best = Some(match best {
                    Some(b) if b.rank() >= verdict.confidence.rank() => b,
                    _ => verdict.confidence,
                });
                for example in &verdict.examples {
                    if evidence.len() < MAX_EVIDENCE {
                        evidence.push(example.clone());
                    }
                }
            }

            CategoryResult {
                category,
                status: if matched_chunks > 0 {
                    CategoryStatus::Confirmed
                } else {
                    CategoryStatus::NotFound
                },
                confidence: best.unwrap_or(Confidence::Low),
                matched_chunks,
                total_chunks,
                evidence,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Polarity;
    use crate::service::analysis::parser::ParseError;

    fn yes(confidence: Confidence, examples: &[&str]) -> Verdict {
        Verdict {
            polarity: Polarity::Yes,
            confidence,
            reasoning: "The content is clearly depicted.".to_string(),
            examples: examples.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn no() -> Verdict {
        Verdict {
            polarity: Polarity::No,
            confidence: Confidence::High,
            reasoning: "Nothing related appears.".to_string(),
            examples: vec![],
        }
    }

    fn chunk_with(entries: Vec<(Category, Verdict)>) -> ChunkOutcome {
        ChunkOutcome::Verdicts(entries.into_iter().collect())
    }

    fn failed_chunk() -> ChunkOutcome {
        ChunkOutcome::Failed(ChunkFailure::Parse(ParseError::MissingJson))
    }

    fn result_for(results: &[CategoryResult], category: Category) -> &CategoryResult {
        results
            .iter()
            .find(|r| r.category == category)
            .expect("category missing from results")
    }

    #[test]
    fn test_two_of_four_chunks_confirm_with_max_confidence() {
        let outcomes = vec![
            chunk_with(vec![(Category::Violence, yes(Confidence::Medium, &["a punch"]))]),
            chunk_with(vec![(Category::Violence, no())]),
            chunk_with(vec![(Category::Violence, yes(Confidence::High, &["a stabbing"]))]),
            chunk_with(vec![(Category::Violence, no())]),
        ];

        let results = fold_outcomes(&outcomes, AcceptancePolicy::Conservative);
        let violence = result_for(&results, Category::Violence);

        assert_eq!(violence.status, CategoryStatus::Confirmed);
        assert_eq!(violence.confidence, Confidence::High);
        assert_eq!(violence.matched_chunks, 2);
        assert_eq!(violence.total_chunks, 4);
        assert_eq!(violence.match_ratio(), "2/4");
        assert_eq!(violence.evidence, vec!["a punch", "a stabbing"]);
    }

    #[test]
    fn test_every_category_appears_exactly_once_in_order() {
        let results = fold_outcomes(&[], AcceptancePolicy::Conservative);
        assert_eq!(results.len(), Category::ALL.len());
        for (result, category) in results.iter().zip(Category::ALL.iter()) {
            assert_eq!(result.category, *category);
            assert_eq!(result.status, CategoryStatus::NotFound);
            assert_eq!(result.confidence, Confidence::Low);
        }
    }

    #[test]
    fn test_failed_chunks_stay_in_the_denominator() {
        let outcomes = vec![
            chunk_with(vec![(Category::Gore, yes(Confidence::High, &[]))]),
            failed_chunk(),
            failed_chunk(),
        ];

        let results = fold_outcomes(&outcomes, AcceptancePolicy::Conservative);
        let gore = result_for(&results, Category::Gore);

        assert_eq!(gore.matched_chunks, 1);
        assert_eq!(gore.total_chunks, 3);
        assert_eq!(gore.match_ratio(), "1/3");
    }

    #[test]
    fn test_evidence_is_capped_in_chunk_order() {
        let outcomes = vec![
            chunk_with(vec![(
                Category::GunUse,
                yes(Confidence::High, &["first", "second"]),
            )]),
            chunk_with(vec![(
                Category::GunUse,
                yes(Confidence::High, &["third", "fourth"]),
            )]),
        ];

        let results = fold_outcomes(&outcomes, AcceptancePolicy::Conservative);
        let gun_use = result_for(&results, Category::GunUse);

        assert_eq!(gun_use.evidence, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rejected_verdicts_do_not_confirm() {
        let outcomes = vec![chunk_with(vec![(
            Category::Death,
            yes(Confidence::Low, &["a funeral"]),
        )])];

        let results = fold_outcomes(&outcomes, AcceptancePolicy::Conservative);
        let death = result_for(&results, Category::Death);
        assert_eq!(death.status, CategoryStatus::NotFound);
        assert_eq!(death.matched_chunks, 0);
        assert!(death.evidence.is_empty());

        // The permissive policy accepts the same verdict
        let results = fold_outcomes(&outcomes, AcceptancePolicy::Permissive);
        let death = result_for(&results, Category::Death);
        assert_eq!(death.status, CategoryStatus::Confirmed);
        assert_eq!(death.confidence, Confidence::Low);
    }

    #[test]
    fn test_missing_category_in_a_chunk_is_no_signal() {
        let outcomes = vec![
            chunk_with(vec![(Category::Vomit, yes(Confidence::Medium, &[]))]),
            chunk_with(vec![(Category::Violence, no())]),
        ];

        let results = fold_outcomes(&outcomes, AcceptancePolicy::Conservative);
        let vomit = result_for(&results, Category::Vomit);
        assert_eq!(vomit.matched_chunks, 1);
        assert_eq!(vomit.total_chunks, 2);
    }
}
