//! REST API endpoint for trigger content analysis

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::model::{AnalysisReport, CategoryStatus, Confidence};
use crate::service::AnalysisService;

/// Request body for document analysis
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Narrative text to analyze; an absent or empty field yields an
    /// all-clear report
    #[serde(default)]
    pub text: String,
}

/// One category outcome in the response
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryFinding {
    /// Category label, e.g. "Sexual Content"
    pub category: String,
    pub status: CategoryStatus,
    pub confidence: Confidence,
    /// Matched chunks over total chunks, e.g. "2/4"
    pub matches: String,
    /// Supporting quotes from the text
    pub examples: Vec<String>,
}

/// Response body for document analysis
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Labels of confirmed categories, or ["None"] when nothing was found
    pub triggers: Vec<String>,
    /// Per-category details, every category present exactly once
    pub results: Vec<CategoryFinding>,
    /// SHA-256 of the analyzed text
    pub document_hash: String,
    /// Model that produced the verdicts
    pub model: String,
    pub total_chunks: usize,
    pub failed_chunks: usize,
    pub generated_at: String,
    pub request_id: String,
}

/// Analyze a document for trigger content
#[utoipa::path(
    post,
    path = "/v1/analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalyzeResponse),
        (status = 502, description = "Analysis failed for every chunk"),
        (status = 504, description = "Analysis deadline exceeded"),
        (status = 500, description = "Internal server error")
    ),
    tag = "analysis"
)]
#[post("/v1/analysis")]
pub async fn analyze(
    service: web::Data<AnalysisService>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let report = service.analyze(&body.text).await?;
    Ok(HttpResponse::Ok().json(to_response(report)))
}

/// Flatten the domain report into the wire shape
fn to_response(report: AnalysisReport) -> AnalyzeResponse {
    let mut triggers = report.confirmed_labels();
    if triggers.is_empty() {
        triggers.push("None".to_string());
    }

    let results = report
        .results
        .iter()
        .map(|r| CategoryFinding {
            category: r.category.label().to_string(),
            status: r.status,
            confidence: r.confidence,
            matches: r.match_ratio(),
            examples: r.evidence.clone(),
        })
        .collect();

    AnalyzeResponse {
        triggers,
        results,
        document_hash: report.document_hash,
        model: report.model,
        total_chunks: report.total_chunks,
        failed_chunks: report.failed_chunks,
        generated_at: report.generated_at.to_rfc3339(),
        request_id: Uuid::new_v4().to_string(),
    }
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze);
}

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze,
        crate::api::health::liveness,
        crate::api::health::readiness
    ),
    components(schemas(
        AnalyzeRequest,
        AnalyzeResponse,
        CategoryFinding,
        CategoryStatus,
        Confidence,
        crate::api::health::HealthStatus,
        crate::api::health::ReadinessStatus,
        crate::api::health::DependencyHealth,
    )),
    tags(
        (name = "analysis", description = "Trigger content analysis"),
        (name = "health", description = "Service health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CategoryResult};
    use chrono::Utc;

    fn report_with(results: Vec<CategoryResult>) -> AnalysisReport {
        AnalysisReport {
            results,
            document_hash: "hash".to_string(),
            model: "test-model".to_string(),
            total_chunks: 2,
            failed_chunks: 0,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_confirmed_categories_become_triggers() {
        let report = report_with(vec![
            CategoryResult {
                category: Category::Violence,
                status: CategoryStatus::Confirmed,
                confidence: Confidence::High,
                matched_chunks: 2,
                total_chunks: 2,
                evidence: vec!["a quote".to_string()],
            },
            CategoryResult {
                category: Category::Death,
                status: CategoryStatus::NotFound,
                confidence: Confidence::Low,
                matched_chunks: 0,
                total_chunks: 2,
                evidence: vec![],
            },
        ]);

        let response = to_response(report);
        assert_eq!(response.triggers, vec!["Violence".to_string()]);
        assert_eq!(response.results[0].matches, "2/2");
        assert_eq!(response.results[0].examples, vec!["a quote".to_string()]);
    }

    #[test]
    fn test_no_confirmed_categories_yields_none_marker() {
        let report = report_with(vec![CategoryResult {
            category: Category::Gore,
            status: CategoryStatus::NotFound,
            confidence: Confidence::Low,
            matched_chunks: 0,
            total_chunks: 2,
            evidence: vec![],
        }]);

        let response = to_response(report);
        assert_eq!(response.triggers, vec!["None".to_string()]);
    }
}
