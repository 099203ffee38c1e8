//! REST API endpoints for grounded discussion analysis

use actix_web::{HttpResponse, Responder, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{OpenApi, ToSchema};

use crate::api::error::{ApiError, ErrorResponse};
use crate::app::AppState;
use crate::model::{AnalysisMetadata, AnalysisResult};
use crate::service::analysis::validation::FieldIssue;

/// Request body for the analysis endpoints
///
/// The legacy route accepts the aliases `questionContext` (for
/// `sessionTopic`) and `currentTranscript` (for `liveTranscript`).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)] // documentation schema; handlers validate the raw payload
pub struct AnalysisRequestBody {
    /// Topic of the discussion session
    pub session_topic: String,
    /// Live transcript fragment; a placeholder is substituted when absent or empty
    pub live_transcript: Option<String>,
    /// One of: insights, synthesis, followup, cross_reference, facilitation
    pub analysis_type: String,
    /// Elapsed session time in minutes
    pub session_duration: Option<u64>,
    /// Rate-limit bucket; defaults to "anonymous"
    pub client_id: Option<String>,
}

/// Static liveness payload served on GET
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl ServiceStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "facilitator-agent".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Run a grounded analysis over a live transcript
#[utoipa::path(
    post,
    path = "/analyze-live",
    request_body = AnalysisRequestBody,
    responses(
        (status = 200, description = "Shaped analysis result", body = AnalysisResult),
        (status = 400, description = "Schema validation failure with field-level issues", body = ErrorResponse),
        (status = 429, description = "Client rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Upstream model provider failure", body = ErrorResponse),
        (status = 503, description = "Provider credentials not configured", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/analyze-live")]
pub async fn analyze_live(
    state: web::Data<AppState>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let shaped = state
        .analysis_service
        .analyze(&payload, &state.grounded_profile)
        .await
        .map_err(|e| ApiError::from_analysis(e, state.config.production))?;

    Ok(HttpResponse::Ok().json(shaped))
}

/// Run a legacy JSON-mode analysis
///
/// Served by the same pipeline as `/analyze-live` under the legacy
/// generation profile: JSON output mode and generic fallback for unknown
/// analysis types.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalysisRequestBody,
    responses(
        (status = 200, description = "Type-dependent JSON analysis with appended metadata"),
        (status = 400, description = "Schema validation failure with field-level issues", body = ErrorResponse),
        (status = 429, description = "Client rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Upstream model provider failure", body = ErrorResponse),
        (status = 503, description = "Provider credentials not configured", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/analyze")]
pub async fn analyze_legacy(
    state: web::Data<AppState>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let shaped = state
        .analysis_service
        .analyze(&payload, &state.legacy_profile)
        .await
        .map_err(|e| ApiError::from_analysis(e, state.config.production))?;

    Ok(HttpResponse::Ok().json(shaped))
}

/// Liveness payload for the grounded route
#[utoipa::path(
    get,
    path = "/analyze-live",
    responses((status = 200, description = "Service is up", body = ServiceStatus)),
    tag = "analysis"
)]
#[get("/analyze-live")]
pub async fn analyze_live_status() -> impl Responder {
    HttpResponse::Ok().json(ServiceStatus::healthy())
}

/// Liveness payload for the legacy route
#[utoipa::path(
    get,
    path = "/analyze",
    responses((status = 200, description = "Service is up", body = ServiceStatus)),
    tag = "analysis"
)]
#[get("/analyze")]
pub async fn analyze_legacy_status() -> impl Responder {
    HttpResponse::Ok().json(ServiceStatus::healthy())
}

/// OpenAPI documentation for the analysis API
#[derive(OpenApi)]
#[openapi(
    paths(analyze_live, analyze_legacy, analyze_live_status, analyze_legacy_status),
    components(schemas(
        AnalysisRequestBody,
        AnalysisResult,
        AnalysisMetadata,
        ErrorResponse,
        FieldIssue,
        ServiceStatus
    )),
    tags(
        (name = "analysis", description = "Grounded co-facilitator analysis endpoints")
    )
)]
pub struct ApiDoc;

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_live)
        .service(analyze_legacy)
        .service(analyze_live_status)
        .service(analyze_legacy_status);
}
