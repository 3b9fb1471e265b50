//! Aggregated analysis reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::category::Category;
use super::verdict::Confidence;

/// Whether a category was confirmed anywhere in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Confirmed,
    NotFound,
}

/// Aggregated outcome for one category across all chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResult {
    pub category: Category,
    pub status: CategoryStatus,
    /// Highest confidence among accepted positive verdicts, `Low` when none
    pub confidence: Confidence,
    /// Chunks with an accepted positive verdict for this category
    pub matched_chunks: usize,
    /// All chunks in the document, failed ones included
    pub total_chunks: usize,
    /// Supporting quotes in chunk order, capped
    pub evidence: Vec<String>,
}

impl CategoryResult {
    /// Ratio rendered for display, e.g. "2/4"
    pub fn match_ratio(&self) -> String {
        format!("{}/{}", self.matched_chunks, self.total_chunks)
    }
}

/// Terminal artifact of a document analysis
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisReport {
    /// One entry per category, in canonical order
    pub results: Vec<CategoryResult>,
    /// SHA-256 of the analyzed text
    pub document_hash: String,
    /// Model that produced the verdicts
    pub model: String,
    pub total_chunks: usize,
    pub failed_chunks: usize,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Labels of all confirmed categories, in canonical order
    pub fn confirmed_labels(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| r.status == CategoryStatus::Confirmed)
            .map(|r| r.category.label().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_ratio_rendering() {
        let result = CategoryResult {
            category: Category::Violence,
            status: CategoryStatus::Confirmed,
            confidence: Confidence::High,
            matched_chunks: 2,
            total_chunks: 4,
            evidence: vec![],
        };
        assert_eq!(result.match_ratio(), "2/4");
    }

    #[test]
    fn test_confirmed_labels_filters_not_found() {
        let report = AnalysisReport {
            results: vec![
                CategoryResult {
                    category: Category::Violence,
                    status: CategoryStatus::Confirmed,
                    confidence: Confidence::Medium,
                    matched_chunks: 1,
                    total_chunks: 1,
                    evidence: vec![],
                },
                CategoryResult {
                    category: Category::Death,
                    status: CategoryStatus::NotFound,
                    confidence: Confidence::Low,
                    matched_chunks: 0,
                    total_chunks: 1,
                    evidence: vec![],
                },
            ],
            document_hash: "abc".to_string(),
            model: "test".to_string(),
            total_chunks: 1,
            failed_chunks: 0,
            generated_at: Utc::now(),
        };
        assert_eq!(report.confirmed_labels(), vec!["Violence".to_string()]);
    }
}
