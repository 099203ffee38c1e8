pub mod analysis;
pub mod llm;
pub mod rate_limit;

pub use analysis::{AnalysisProfile, AnalysisService};
pub use llm::LlmClient;
pub use rate_limit::FixedWindowLimiter;
