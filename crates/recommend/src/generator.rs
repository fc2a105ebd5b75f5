//! Text-generation client.
//!
//! Speaks the Messages API: one system instruction plus one user message
//! in, a list of content blocks out. Only `text` blocks are kept.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Generation calls are slow; allow well beyond a typical reply.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Messages API version header value.
const API_VERSION: &str = "2023-06-01";

/// Errors from the text-generation layer.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The generation service returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Free-text generation from a system instruction and a user message.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// API base URL, without the `/v1/messages` suffix.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl GeneratorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                      |
    /// |-------------------------|------------------------------|
    /// | `GENERATOR_BASE_URL`    | `https://api.anthropic.com`  |
    /// | `GENERATOR_API_KEY`     | empty                        |
    /// | `GENERATOR_MODEL`       | `claude-3-5-sonnet-latest`   |
    /// | `GENERATOR_MAX_TOKENS`  | `1024`                       |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GENERATOR_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".into()),
            api_key: std::env::var("GENERATOR_API_KEY").unwrap_or_default(),
            model: std::env::var("GENERATOR_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet-latest".into()),
            max_tokens: std::env::var("GENERATOR_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
        }
    }
}

// ---------------------------------------------------------------------------
// MessagesClient
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// HTTP [`TextGenerator`] for a Messages-compatible endpoint.
pub struct MessagesClient {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl MessagesClient {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": user }],
        })
    }
}

#[async_trait]
impl TextGenerator for MessagesClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(system, user))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply: MessagesResponse = response.json().await?;
        Ok(concat_text(&reply))
    }
}

fn concat_text(reply: &MessagesResponse) -> String {
    reply
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text.as_str())
        .collect()
}
