//! Gemini text generation client
//!
//! Speaks the `models/{model}:generateContent` REST endpoint. The rest of the
//! pipeline reaches the model through the [`TextGenerator`] trait so tests can
//! substitute deterministic generators.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP 429 from the model endpoint
    #[error("Rate limited by model endpoint")]
    RateLimited,

    /// HTTP 5xx from the model endpoint
    #[error("Model endpoint error: status {0}")]
    Upstream(u16),

    /// Connection, TLS, or timeout failure below the HTTP layer
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 4xx other than 429: bad key, bad model name, oversized prompt
    #[error("Model rejected the request (status {status}): {message}")]
    InvalidRequest { status: u16, message: String },

    /// The prompt was refused by the safety filter
    #[error("Prompt blocked by model safety filter: {0}")]
    Blocked(String),

    /// A well-formed response with no usable text
    #[error("Model returned no usable text")]
    Empty,

    /// The response envelope could not be decoded
    #[error("Failed to decode model response: {0}")]
    Decode(String),
}

impl LlmError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited | LlmError::Upstream(_) | LlmError::Transport(_)
        )
    }
}

/// Boundary between the pipeline and the text model.
///
/// Implementations take a complete prompt and return the raw text blob the
/// model produced; interpreting that text is the parser's job.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

// Wire types for the generateContent request

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

// Wire types for the generateContent response

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the Gemini generateContent API
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// The base URL is resolved in this order:
    /// 1. `GEMINI_BASE_URL` environment variable if set
    /// 2. Default Google Generative Language API URL
    pub fn new(api_key: String, model: String) -> Self {
        let resolved_url = env::var(GEMINI_BASE_URL_ENV)
            .ok()
            .unwrap_or_else(|| GEMINI_API_BASE_URL.to_string());

        Self {
            client: Client::new(),
            base_url: resolved_url,
            api_key,
            model,
        }
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        // Temperature pinned to zero for reproducible verdicts
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_length = prompt.len(),
            "Sending generateContent request"
        );

        let start_time = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if status.is_server_error() {
            return Err(LlmError::Upstream(status.as_u16()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(LlmError::InvalidRequest {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let decoded: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::Decode(format!("Failed to deserialize response: {}", e)))?;

        let text = extract_text(decoded)?;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            response_length = text.len(),
            "generateContent request completed"
        );

        Ok(text)
    }
}

/// Unwrap the response envelope down to the generated text
fn extract_text(response: GenerateResponse) -> Result<String, LlmError> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(LlmError::Blocked(reason.clone()));
        }
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(LlmError::Empty);
    };

    if matches!(candidate.finish_reason.as_deref(), Some("SAFETY")) {
        return Err(LlmError::Blocked("candidate stopped for safety".to_string()));
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::Empty);
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_content(prompt).await
    }
}
