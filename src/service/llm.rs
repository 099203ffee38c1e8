//! Shared LLM client and completion provider interface
//!
//! Wraps a single call to an OpenAI-compatible chat-completions endpoint and
//! surfaces the raw completion text plus token usage. Failures are classified
//! from the provider's HTTP status code, never from message text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Connect timeout for the provider HTTP client
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum provider error body length carried into error details
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Output mode requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Unconstrained text output
    Text,
    /// Provider-native structured-JSON output mode
    JsonObject,
}

/// Fixed generation parameters for one profile
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

/// One completion request: system instruction, built prompt, fixed parameters
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub params: GenerationParams,
}

/// Raw completion result
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    /// Total tokens reported by the provider (0 when usage is absent)
    pub tokens_used: u32,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("provider rejected the configured credentials")]
    Unauthorized,

    #[error("provider-side rate limit hit")]
    RateLimited,

    #[error("provider call exceeded the configured deadline")]
    Timeout,

    #[error("HTTP transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("provider returned an empty completion")]
    EmptyCompletion,

    #[error("failed to decode provider response: {0}")]
    MalformedResponse(String),
}

/// Trait for completion providers
///
/// The single seam between the analysis pipeline and the external model
/// service; tests substitute a stub implementation.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform one completion attempt; no retries
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}

// Chat-completions wire types

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatSpec>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormatSpec {
    #[serde(rename = "type")]
    format: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// Shared LLM client for an OpenAI-compatible API
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    ///
    /// `timeout` bounds the whole provider call; expiry surfaces as
    /// [`CompletionError::Timeout`].
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let start_time = std::time::Instant::now();
        let params = &request.params;

        let body = ChatCompletionBody {
            model: &params.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            response_format: match params.response_format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(ResponseFormatSpec {
                    format: "json_object",
                }),
            },
        };

        tracing::debug!(
            model = %params.model,
            prompt_length = request.prompt.len(),
            max_tokens = params.max_tokens,
            "Initiating provider completion call"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Transport(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CompletionError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string())
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(CompletionError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let text = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CompletionError::EmptyCompletion);
        }

        let tokens_used = completion.usage.map(|u| u.total_tokens).unwrap_or(0);

        tracing::info!(
            model = %params.model,
            elapsed_ms = start_time.elapsed().as_millis(),
            tokens_used = tokens_used,
            "Provider completion call succeeded"
        );

        Ok(Completion {
            text: text.to_string(),
            tokens_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(response_format: ResponseFormat) -> GenerationParams {
        GenerationParams {
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_tokens: 800,
            response_format,
        }
    }

    fn request(response_format: ResponseFormat) -> CompletionRequest {
        CompletionRequest {
            system: "system instruction".to_string(),
            prompt: "user prompt".to_string(),
            params: params(response_format),
        }
    }

    async fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new("test-key", &server.uri(), Duration::from_secs(5))
            .expect("client must build")
    }

    #[tokio::test]
    async fn test_successful_completion_surfaces_text_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "grounded analysis"}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 35, "total_tokens": 155}
            })))
            .mount(&server)
            .await;

        let completion = client_for(&server)
            .await
            .complete(&request(ResponseFormat::Text))
            .await
            .expect("completion must succeed");

        assert_eq!(completion.text, "grounded analysis");
        assert_eq!(completion.tokens_used, 155);
    }

    #[tokio::test]
    async fn test_json_mode_requests_provider_json_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "response_format": {"type": "json_object"},
                "temperature": 0.3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"ok\":true}"}}],
                "usage": {"total_tokens": 12}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let completion = client_for(&server)
            .await
            .complete(&request(ResponseFormat::JsonObject))
            .await
            .expect("completion must succeed");

        assert_eq!(completion.text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_unauthorized_is_classified_from_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&request(ResponseFormat::Text))
            .await
            .expect_err("401 must fail");

        assert!(matches!(err, CompletionError::Unauthorized));
    }

    #[tokio::test]
    async fn test_provider_rate_limit_is_classified_from_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&request(ResponseFormat::Text))
            .await
            .expect_err("429 must fail");

        assert!(matches!(err, CompletionError::RateLimited));
    }

    #[tokio::test]
    async fn test_other_provider_failure_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&request(ResponseFormat::Text))
            .await
            .expect_err("500 must fail");

        match err {
            CompletionError::Provider { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_completion_is_reported_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "   "}}],
                "usage": {"total_tokens": 3}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&request(ResponseFormat::Text))
            .await
            .expect_err("blank completion must fail");

        assert!(matches!(err, CompletionError::EmptyCompletion));
    }
}
