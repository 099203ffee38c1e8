//! Error taxonomy for the analysis pipeline

use thiserror::Error;

use crate::service::analysis::validation::FieldIssue;
use crate::service::llm::CompletionError;

/// Failure modes of one analysis request, in pipeline order
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// Payload violated one or more field constraints; never retried
    #[error("request validation failed")]
    Validation(Vec<FieldIssue>),

    /// Client exhausted its window; caller must back off until reset
    #[error("rate limit exceeded")]
    RateLimited,

    /// No provider credentials configured; requires operator action
    #[error("model provider credentials are not configured")]
    MissingCredentials,

    /// Provider call failed; no automatic retry is performed
    #[error("provider call failed: {0}")]
    Upstream(#[from] CompletionError),
}
