pub mod analysis;
pub mod llm;
pub mod rate_limit;
pub mod retry;

pub use analysis::AnalysisService;
pub use llm::{GeminiClient, TextGenerator};
pub use rate_limit::RateLimiter;
pub use retry::RetrySettings;
