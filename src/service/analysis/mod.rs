//! Grounded analysis orchestration
//!
//! One service drives both HTTP variants: validation, rate-limit admission,
//! prompt construction, a single provider call, and response shaping run in
//! that order, with the provider call as the only suspension point. The
//! historical strict/legacy split is expressed as two [`AnalysisProfile`]
//! values over the same pipeline.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::model::{AnalysisResult, UnknownTypePolicy};
use crate::service::llm::{
    CompletionProvider, CompletionRequest, GenerationParams, ResponseFormat,
};
use crate::service::rate_limit::FixedWindowLimiter;

pub mod confidence;
pub mod error;
pub mod prompts;
pub mod shape;
pub mod validation;

pub use error::AnalysisError;

/// Generation and policy configuration for one route variant
#[derive(Debug, Clone)]
pub struct AnalysisProfile {
    pub params: GenerationParams,
    pub unknown_type_policy: UnknownTypePolicy,
}

impl AnalysisProfile {
    /// Grounded free-text profile: larger model, low temperature, strict typing
    pub fn grounded(model: &str) -> Self {
        Self {
            params: GenerationParams {
                model: model.to_string(),
                temperature: 0.3,
                max_tokens: 800,
                response_format: ResponseFormat::Text,
            },
            unknown_type_policy: UnknownTypePolicy::Reject,
        }
    }

    /// Legacy JSON-mode profile: cheaper model, higher temperature, generic
    /// fallback for unknown analysis types
    pub fn legacy(model: &str) -> Self {
        Self {
            params: GenerationParams {
                model: model.to_string(),
                temperature: 0.7,
                max_tokens: 400,
                response_format: ResponseFormat::JsonObject,
            },
            unknown_type_policy: UnknownTypePolicy::GenericFallback,
        }
    }
}

/// Shaped outcome of one analysis request
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ShapedResponse {
    Grounded(AnalysisResult),
    Legacy(Value),
}

/// Service for grounded discussion analysis
pub struct AnalysisService {
    provider: Option<Box<dyn CompletionProvider>>,
    limiter: Arc<FixedWindowLimiter>,
}

impl AnalysisService {
    /// Create the service
    ///
    /// `provider` is `None` when no API key was resolved at startup; requests
    /// then short-circuit with [`AnalysisError::MissingCredentials`] before
    /// any provider call.
    pub fn new(
        provider: Option<Box<dyn CompletionProvider>>,
        limiter: Arc<FixedWindowLimiter>,
    ) -> Self {
        Self { provider, limiter }
    }

    /// Whether provider credentials were configured
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Run the full pipeline for one inbound payload
    pub async fn analyze(
        &self,
        payload: &Value,
        profile: &AnalysisProfile,
    ) -> Result<ShapedResponse, AnalysisError> {
        let request = validation::validate(payload, profile.unknown_type_policy)
            .map_err(AnalysisError::Validation)?;

        if !self.limiter.admit(&request.client_id, Instant::now()) {
            return Err(AnalysisError::RateLimited);
        }

        // Credentials are checked before any prompt is sent, so their absence
        // never surfaces as a provider failure
        let provider = self
            .provider
            .as_ref()
            .ok_or(AnalysisError::MissingCredentials)?;

        let prompt = prompts::build_analysis_prompt(
            &request.analysis,
            &request.session_topic,
            &request.transcript,
        );

        let start_time = Instant::now();
        tracing::debug!(
            analysis_type = request.analysis.label(),
            client_id = %request.client_id,
            transcript_length = request.supplied_transcript_len,
            model = %profile.params.model,
            "Dispatching analysis to model provider"
        );

        let completion = provider
            .complete(&CompletionRequest {
                system: prompts::ANALYSIS_SYSTEM_PROMPT.to_string(),
                prompt,
                params: profile.params.clone(),
            })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    analysis_type = request.analysis.label(),
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "Provider call for analysis failed"
                );
            })?;

        tracing::info!(
            analysis_type = request.analysis.label(),
            elapsed_ms = start_time.elapsed().as_millis(),
            tokens_used = completion.tokens_used,
            "Analysis completed"
        );

        match profile.params.response_format {
            ResponseFormat::Text => Ok(ShapedResponse::Grounded(shape::shape_grounded(
                &request,
                &completion,
            ))),
            ResponseFormat::JsonObject => Ok(ShapedResponse::Legacy(shape::shape_legacy(
                &request,
                &completion,
            ))),
        }
    }
}
