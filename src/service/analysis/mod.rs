//! Trigger content analysis pipeline
//!
//! The input is chunked and fanned out to the text model under a shared rate
//! limiter. Each response is parsed into verdicts and the verdicts are folded
//! into one report. Individual chunk failures are logged and absorbed; the
//! document as a whole fails only when no chunk produced verdicts.

pub mod acceptance;
pub mod aggregate;
pub mod chunk;
pub mod error;
pub mod parser;
pub mod prompts;

pub use error::{AnalysisError, ChunkFailure};

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use tokio::time::Duration;

use crate::model::config::AnalysisConfig;
use crate::model::{AnalysisReport, CategoryStatus};
use crate::service::analysis::acceptance::AcceptancePolicy;
use crate::service::analysis::aggregate::{ChunkOutcome, fold_outcomes};
use crate::service::analysis::chunk::{Chunk, chunk_text};
use crate::service::analysis::parser::parse_verdicts;
use crate::service::analysis::prompts::build_analysis_prompt;
use crate::service::llm::TextGenerator;
use crate::service::rate_limit::RateLimiter;
use crate::service::retry::{RetrySettings, send_with_retry};

/// Service that analyzes documents for trigger content
pub struct AnalysisService {
    generator: Arc<dyn TextGenerator>,
    limiter: RateLimiter,
    retry: RetrySettings,
    policy: AcceptancePolicy,
    chunk_chars: usize,
    workers: usize,
    timeout: Option<Duration>,
    model: String,
}

impl AnalysisService {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &AnalysisConfig, model: String) -> Self {
        let limiter = RateLimiter::new(
            config.calls_per_window,
            Duration::from_secs(config.window_secs),
        );
        let retry = RetrySettings {
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_secs(config.initial_backoff_secs),
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        };
        let policy = if config.permissive_acceptance {
            AcceptancePolicy::Permissive
        } else {
            AcceptancePolicy::Conservative
        };

        tracing::info!(
            model = %model,
            chunk_chars = config.chunk_chars,
            workers = config.workers,
            calls_per_window = config.calls_per_window,
            policy = ?policy,
            "Analysis service initialized"
        );

        Self {
            generator,
            limiter,
            retry,
            policy,
            chunk_chars: config.chunk_chars,
            workers: config.workers.max(1),
            timeout: config.timeout_secs.map(Duration::from_secs),
            model,
        }
    }

    /// Model name verdicts are produced with
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Analyze a document for trigger content.
    ///
    /// Empty input short-circuits to an all-NOT_FOUND report without touching
    /// the model. With a configured deadline, the whole pipeline runs under
    /// it and in-flight chunk work is dropped when it elapses.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        match self.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, self.run(text)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        deadline_secs = deadline.as_secs(),
                        "Analysis deadline exceeded, dropping in-flight chunks"
                    );
                    Err(AnalysisError::DeadlineExceeded {
                        deadline_secs: deadline.as_secs(),
                    })
                }
            },
            None => self.run(text).await,
        }
    }

    async fn run(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        let start_time = std::time::Instant::now();
        let document_hash = compute_hash(text);
        let chunks = chunk_text(text, self.chunk_chars);
        let total_chunks = chunks.len();

        tracing::debug!(
            document_hash = %document_hash,
            total_chunks = total_chunks,
            "Starting trigger analysis"
        );

        if chunks.is_empty() {
            tracing::debug!(document_hash = %document_hash, "Empty input, nothing to analyze");
            return Ok(self.build_report(document_hash, &[], start_time));
        }

        let chunk_futures: Vec<_> = chunks
            .iter()
            .map(|chunk| self.analyze_chunk(chunk))
            .collect();

        let outcomes: Vec<ChunkOutcome> = futures::stream::iter(chunk_futures)
            .buffered(self.workers)
            .collect()
            .await;

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, ChunkOutcome::Failed(_)))
            .count();

        if failed == total_chunks {
            tracing::error!(
                document_hash = %document_hash,
                failed = failed,
                "Every chunk failed analysis"
            );
            return Err(AnalysisError::AllChunksFailed { failed });
        }

        Ok(self.build_report(document_hash, &outcomes, start_time))
    }

    /// Analyze one chunk; failures are folded into the outcome, never raised
    async fn analyze_chunk(&self, chunk: &Chunk) -> ChunkOutcome {
        let prompt = build_analysis_prompt(&chunk.text);

        let raw = match send_with_retry(
            self.generator.as_ref(),
            &self.limiter,
            &self.retry,
            &prompt,
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    chunk_index = chunk.index,
                    error = %e,
                    "Chunk analysis failed, chunk contributes no verdicts"
                );
                return ChunkOutcome::Failed(ChunkFailure::Llm(e));
            }
        };

        match parse_verdicts(&raw) {
            Ok(verdicts) => {
                tracing::debug!(
                    chunk_index = chunk.index,
                    verdict_count = verdicts.len(),
                    "Chunk analyzed"
                );
                ChunkOutcome::Verdicts(verdicts)
            }
            Err(e) => {
                tracing::warn!(
                    chunk_index = chunk.index,
                    error = %e,
                    "Chunk response was unparseable, chunk contributes no verdicts"
                );
                ChunkOutcome::Failed(ChunkFailure::Parse(e))
            }
        }
    }

    fn build_report(
        &self,
        document_hash: String,
        outcomes: &[ChunkOutcome],
        start_time: std::time::Instant,
    ) -> AnalysisReport {
        let results = fold_outcomes(outcomes, self.policy);
        let failed_chunks = outcomes
            .iter()
            .filter(|o| matches!(o, ChunkOutcome::Failed(_)))
            .count();
        let confirmed = results
            .iter()
            .filter(|r| r.status == CategoryStatus::Confirmed)
            .count();

        tracing::info!(
            document_hash = %document_hash,
            total_chunks = outcomes.len(),
            failed_chunks = failed_chunks,
            confirmed_categories = confirmed,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Trigger analysis complete"
        );

        AnalysisReport {
            results,
            document_hash,
            model: self.model.clone(),
            total_chunks: outcomes.len(),
            failed_chunks,
            generated_at: Utc::now(),
        }
    }
}

/// SHA-256 hex digest of the document text
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_is_stable() {
        assert_eq!(compute_hash("abc"), compute_hash("abc"));
        assert_ne!(compute_hash("abc"), compute_hash("abd"));
        assert_eq!(compute_hash("abc").len(), 64);
    }
}
