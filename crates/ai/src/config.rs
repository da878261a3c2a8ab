//! Generation client configuration

use formai_core::{FormError, FormResult};
use std::time::Duration;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the model id
pub const MODEL_ENV: &str = "FORMAI_MODEL";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "FORMAI_BASE_URL";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the generative model client
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    /// API key; required before any request is made
    pub api_key: Option<String>,

    /// Model id, e.g. `gemini-1.5-flash`
    pub model: String,

    /// Base URL of the REST API, without a trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Sampling temperature; the model default when unset
    pub temperature: Option<f32>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
        }
    }
}

impl AiConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating blank values as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        config.api_key = read(API_KEY_ENV);
        if let Some(model) = read(MODEL_ENV) {
            config.model = model;
        }
        if let Some(base_url) = read(BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        config
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The API key, or an error if it is missing
    pub fn require_api_key(&self) -> FormResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                FormError::MissingConfig(format!(
                    "Gemini API key not configured (set {})",
                    API_KEY_ENV
                ))
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
