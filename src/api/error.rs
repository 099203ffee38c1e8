//! Unified API error handling
//!
//! This module provides a consistent error response format across all API
//! endpoints. Every failure body carries at least `success` and `error`
//! fields plus a request id; no failure path panics.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::service::analysis::validation::FieldIssue;
use crate::service::analysis::AnalysisError;
use crate::service::llm::CompletionError;

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Field-level validation issues (validation failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<FieldIssue>>,
    /// Diagnostic detail; omitted in production deployments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints return `Result<T, ApiError>` for consistent error
/// handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Schema-validation failure (400)
    #[error("Request validation failed")]
    Validation { issues: Vec<FieldIssue> },

    /// Per-client rate limit exceeded (429)
    #[error("Rate limit exceeded; retry after the current window resets")]
    RateLimited,

    /// Provider credentials not configured (503)
    #[error("Model provider credentials are not configured")]
    MissingCredentials { details: Option<String> },

    /// Upstream model provider failure (500)
    #[error("Model provider call failed")]
    Upstream {
        kind: &'static str,
        details: Option<String>,
    },
}

impl ApiError {
    /// Map a pipeline error into the API surface
    ///
    /// `production` gates the `details` field: diagnostic text from upstream
    /// failures is only exposed in non-production deployments.
    pub fn from_analysis(err: AnalysisError, production: bool) -> Self {
        match err {
            AnalysisError::Validation(issues) => ApiError::Validation { issues },
            AnalysisError::RateLimited => ApiError::RateLimited,
            AnalysisError::MissingCredentials => ApiError::MissingCredentials {
                details: (!production)
                    .then(|| "no API key found in the configured environment variables".to_string()),
            },
            AnalysisError::Upstream(cause) => {
                let kind = upstream_kind(&cause);
                ApiError::Upstream {
                    kind,
                    details: (!production).then(|| cause.to_string()),
                }
            }
        }
    }
}

/// Tagged kind string for an upstream failure, derived from the provider
/// client's structured error variants
fn upstream_kind(err: &CompletionError) -> &'static str {
    match err {
        CompletionError::Unauthorized => "upstream_auth",
        CompletionError::RateLimited => "upstream_rate_limited",
        CompletionError::Timeout => "upstream_timeout",
        CompletionError::Transport(_) => "upstream_transport",
        CompletionError::Provider { .. } => "upstream_provider",
        CompletionError::EmptyCompletion => "upstream_empty_completion",
        CompletionError::MalformedResponse(_) => "upstream_malformed_response",
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MissingCredentials { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, issues, details) = match self {
            ApiError::Validation { issues } => {
                ("validation_failed", Some(issues.clone()), None)
            }
            ApiError::RateLimited => ("rate_limit_exceeded", None, None),
            ApiError::MissingCredentials { details } => {
                ("configuration_error", None, details.clone())
            }
            ApiError::Upstream { kind, details } => (*kind, None, details.clone()),
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error: error_type.to_string(),
            message: self.to_string(),
            issues,
            details,
            request_id: Uuid::new_v4().to_string(),
        })
    }
}
