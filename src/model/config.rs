use serde::Deserialize;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "TRIGGER_INTEL_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_API_KEY: &str = "GEMINI_API_KEY";
const ENV_API_KEY_FILE: &str = "GEMINI_API_KEY_FILE";
const DEFAULT_API_KEY_FILE: &str = "google_api_key.txt";

const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Upper bound on concurrent in-flight chunks
const MAX_WORKERS: usize = 4;

/// Analysis pipeline tuning
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Chunk size in characters
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    /// Model calls allowed per rate-limit window
    #[serde(default = "default_calls_per_window")]
    pub calls_per_window: u32,
    /// Rate-limit window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Attempt ceiling per chunk, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the second attempt, in seconds
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,
    /// Backoff cap in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    /// Concurrent in-flight chunks (clamped to 1..=4)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Accept any YES verdict instead of the negation-aware policy
    #[serde(default)]
    pub permissive_acceptance: bool,
    /// Whole-document deadline in seconds; absent means no deadline
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_chunk_chars() -> usize {
    1000
}

fn default_calls_per_window() -> u32 {
    58
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_secs() -> u64 {
    4
}

fn default_max_backoff_secs() -> u64 {
    20
}

fn default_workers() -> usize {
    2
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_chars: default_chunk_chars(),
            calls_per_window: default_calls_per_window(),
            window_secs: default_window_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            workers: default_workers(),
            permissive_acceptance: false,
            timeout_secs: None,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub analysis: Option<AnalysisConfig>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub model: String,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            model: DEFAULT_MODEL.to_string(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let model =
            std::env::var(ENV_ANALYSIS_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        // Load config file
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut analysis = Self::load_config_file(&config_path)
            .and_then(|cf| cf.analysis)
            .unwrap_or_default();

        if analysis.workers < 1 || analysis.workers > MAX_WORKERS {
            tracing::warn!(
                workers = analysis.workers,
                "Configured worker count out of range, clamping to 1..={}",
                MAX_WORKERS
            );
            analysis.workers = analysis.workers.clamp(1, MAX_WORKERS);
        }
        if analysis.max_attempts == 0 {
            tracing::warn!("Configured attempt ceiling is zero, using one attempt");
            analysis.max_attempts = 1;
        }

        Self {
            analysis,
            model,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Handle empty file
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve the model API key.
///
/// Resolution order:
/// 1. `GEMINI_API_KEY` environment variable
/// 2. A key file, `google_api_key.txt` by default, overridable through
///    `GEMINI_API_KEY_FILE`
///
/// Returns `None` when neither source yields a non-empty key.
pub fn resolve_api_key() -> Option<String> {
    if let Ok(key) = std::env::var(ENV_API_KEY) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Some(key);
        }
    }

    let key_path =
        std::env::var(ENV_API_KEY_FILE).unwrap_or_else(|_| DEFAULT_API_KEY_FILE.to_string());

    match fs::read_to_string(&key_path) {
        Ok(contents) => {
            let key = contents.trim().to_string();
            if key.is_empty() {
                tracing::warn!(path = %key_path, "API key file is empty");
                None
            } else {
                tracing::info!(path = %key_path, "Loaded API key from file");
                Some(key)
            }
        }
        Err(e) => {
            tracing::debug!(path = %key_path, error = %e, "No API key file found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_defaults() {
        let analysis = AnalysisConfig::default();
        assert_eq!(analysis.chunk_chars, 1000);
        assert_eq!(analysis.calls_per_window, 58);
        assert_eq!(analysis.window_secs, 60);
        assert_eq!(analysis.max_attempts, 5);
        assert_eq!(analysis.initial_backoff_secs, 4);
        assert_eq!(analysis.max_backoff_secs, 20);
        assert_eq!(analysis.workers, 2);
        assert!(!analysis.permissive_acceptance);
        assert!(analysis.timeout_secs.is_none());
    }

    #[test]
    fn test_config_file_partial_analysis_section() {
        let yaml = "analysis:\n  chunk_chars: 500\n  permissive_acceptance: true\n";
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let analysis = file.analysis.unwrap();
        assert_eq!(analysis.chunk_chars, 500);
        assert!(analysis.permissive_acceptance);
        // Unspecified fields keep their defaults
        assert_eq!(analysis.calls_per_window, 58);
        assert_eq!(analysis.workers, 2);
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
