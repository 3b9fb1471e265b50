//! Application state and service initialization
//!
//! This module centralizes all service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::Arc;

use crate::model::{Config, config};
use crate::service::{AnalysisService, GeminiClient};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Trigger content analysis service
    pub analysis_service: Arc<AnalysisService>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// Resolves the model credential (requires `GEMINI_API_KEY` or a key
    /// file) and builds the analysis service around it. Fails before any
    /// network activity when the credential is missing.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let api_key =
            config::resolve_api_key().ok_or(AppError::MissingConfig("GEMINI_API_KEY"))?;

        let client = GeminiClient::new(api_key, config.model.clone());
        let analysis_service = Arc::new(AnalysisService::new(
            Arc::new(client),
            &config.analysis,
            config.model.clone(),
        ));

        Ok(Self { analysis_service })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),
}
