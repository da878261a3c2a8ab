//! Generative model backends
//!
//! [`GenerativeModel`] is the seam between the generator and the network.
//! [`GeminiModel`] talks to the Gemini `generateContent` REST endpoint;
//! tests substitute their own implementations.

use crate::config::AiConfig;
use async_trait::async_trait;
use formai_core::{FormError, FormResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw text reply of a model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,

    /// Total tokens reported by the backend, or 0 when not reported
    pub tokens_used: u64,
}

impl ModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens_used: 0,
        }
    }
}

/// A text-in, text-out generative model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Identifier recorded alongside generations
    fn model_id(&self) -> &str;

    /// Send a single prompt and return the reply text
    async fn generate_content(&self, prompt: &str) -> FormResult<ModelReply>;
}

// ============================================================================
// Gemini
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Gemini REST client
#[derive(Debug, Clone)]
pub struct GeminiModel {
    config: AiConfig,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiModel {
    /// Build a client; fails without an API key, before any request is made
    pub fn new(config: AiConfig) -> FormResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FormError::upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            http,
        })
    }

    /// Build a client from the process environment
    pub fn from_env() -> FormResult<Self> {
        Self::new(AiConfig::from_env())
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(&self, prompt: &str) -> FormResult<ModelReply> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self
                .config
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        debug!("POST {} ({} prompt chars)", self.endpoint(), prompt.len());
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FormError::upstream(format!("Request to model failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FormError::upstream(format!("Failed to read model response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(FormError::upstream(format!(
                "Model endpoint returned {}: {}",
                status.as_u16(),
                message
            )));
        }

        let parsed: GenerateResponse = serde_json::from_slice(&bytes)
            .map_err(|e| FormError::upstream(format!("Unexpected model response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .ok_or_else(|| FormError::upstream("Model returned no candidates"))?;

        let tokens_used = parsed
            .usage_metadata
            .map(|usage| usage.total_token_count)
            .unwrap_or(0);

        debug!("Model replied with {} chars, {} tokens", text.len(), tokens_used);
        Ok(ModelReply { text, tokens_used })
    }
}

// ============================================================================
// Tests
// ============================================================================
