use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "FACILITATOR_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Candidate environment variables for the provider API key, first non-empty wins
const API_KEY_ENV_VARS: &[&str] = &["FACILITATOR_API_KEY", "OPENAI_API_KEY"];

/// Per-client rate limit settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admitted requests per client per window
    pub ceiling: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ceiling: 50,
            window_secs: 3600,
        }
    }
}

/// Model provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model for the grounded free-text profile
    pub grounded_model: String,
    /// Model for the legacy JSON-mode profile
    pub legacy_model: String,
    /// Deadline for a single provider call in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            grounded_model: "gpt-4o".to_string(),
            legacy_model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub rate_limit: RateLimitConfig,
    pub provider: ProviderConfig,
    pub port: u16,
    pub host: String,
    /// Production deployments omit `details` from error payloads
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            provider: ProviderConfig::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
            production: false,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let production = env::var("FACILITATOR_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let config_path =
            env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self {
            rate_limit: file.rate_limit,
            provider: file.provider,
            port,
            host,
            production,
        }
    }

    /// Resolve the provider API key from the ordered candidate list
    ///
    /// Returns `None` when no candidate is set to a non-empty value. Absence
    /// is a configuration condition for the analysis routes, not a startup
    /// failure.
    pub fn resolve_api_key(&self) -> Option<String> {
        for name in API_KEY_ENV_VARS {
            if let Ok(value) = env::var(name) {
                if !value.trim().is_empty() {
                    tracing::debug!(source = name, "Resolved provider API key");
                    return Some(value);
                }
            }
        }
        None
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
