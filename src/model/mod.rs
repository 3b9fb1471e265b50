pub mod category;
pub mod config;
pub mod report;
pub mod verdict;

pub use category::Category;
pub use config::{AnalysisConfig, Config};
pub use report::{AnalysisReport, CategoryResult, CategoryStatus};
pub use verdict::{Confidence, Polarity, Verdict};
