//! Errors for the analysis pipeline

use crate::service::analysis::parser::ParseError;
use crate::service::llm::LlmError;

/// Why a single chunk produced no verdicts.
///
/// A chunk failure never fails the document on its own; it is logged with the
/// chunk index and the chunk simply contributes nothing to aggregation.
#[derive(Debug, thiserror::Error)]
pub enum ChunkFailure {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("response parsing failed: {0}")]
    Parse(#[from] ParseError),
}

/// Document-level analysis failure
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Every chunk failed; no report would carry any signal
    #[error("analysis failed for all {failed} chunks")]
    AllChunksFailed { failed: usize },

    /// The configured whole-document deadline elapsed
    #[error("analysis deadline of {deadline_secs}s exceeded")]
    DeadlineExceeded { deadline_secs: u64 },
}
