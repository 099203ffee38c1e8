//! Application state and service initialization
//!
//! This module centralizes all service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::Arc;
use std::time::Duration;

use crate::model::Config;
use crate::service::llm::CompletionProvider;
use crate::service::{AnalysisProfile, AnalysisService, FixedWindowLimiter, LlmClient};

/// Application state containing all services and shared resources
///
/// This struct centralizes service initialization and makes it easy to inject
/// dependencies into Actix-web handlers.
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Analysis pipeline shared by both route variants
    pub analysis_service: AnalysisService,
    /// Generation profile for the grounded route
    pub grounded_profile: AnalysisProfile,
    /// Generation profile for the legacy route
    pub legacy_profile: AnalysisProfile,
    /// Rate-limit store, shared with the reaper task
    pub limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Provider API key resolution from the ordered env-var candidates
    /// 2. LLM client construction (skipped with a warning when no key is set;
    ///    the analysis routes then report a configuration error per request)
    /// 3. Rate limiter and generation profile construction
    pub fn new(config: Config) -> Result<Self, AppError> {
        let provider: Option<Box<dyn CompletionProvider>> = match config.resolve_api_key() {
            Some(api_key) => {
                let client = LlmClient::new(
                    &api_key,
                    &config.provider.base_url,
                    Duration::from_secs(config.provider.timeout_secs),
                )
                .map_err(|e| AppError::InvalidConfig(format!("provider HTTP client: {e}")))?;

                tracing::info!(
                    base_url = %config.provider.base_url,
                    grounded_model = %config.provider.grounded_model,
                    legacy_model = %config.provider.legacy_model,
                    "LLM client initialized"
                );
                Some(Box::new(client))
            }
            None => {
                tracing::warn!(
                    "No provider API key configured; analysis routes will return a configuration error"
                );
                None
            }
        };

        let limiter = Arc::new(FixedWindowLimiter::new(
            config.rate_limit.ceiling,
            Duration::from_secs(config.rate_limit.window_secs),
        ));

        let analysis_service = AnalysisService::new(provider, Arc::clone(&limiter));

        Ok(Self {
            grounded_profile: AnalysisProfile::grounded(&config.provider.grounded_model),
            legacy_profile: AnalysisProfile::legacy(&config.provider.legacy_model),
            analysis_service,
            limiter,
            config,
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
