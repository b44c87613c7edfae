//! Generate text with an OpenAI-compatible chat completion API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4-turbo";
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub api_base: String,
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            api_base: OPENAI_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateAiContentParams {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature, 0.0 to 2.0.
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedContent {
    pub text: String,
    pub model: String,
    pub tokens_used: u64,
}

/// Generate content from a prompt.
///
/// Unknown models come back as 4xx and are unrecoverable; rate limits
/// (429) and provider outages stay retryable.
pub async fn generate_ai_content(
    config: &AiConfig,
    params: GenerateAiContentParams,
) -> Result<GeneratedContent> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("OPENAI_API_KEY is not configured".into()))?;

    if params.prompt.trim().is_empty() {
        return Err(Error::InvalidInput("prompt cannot be empty".into()));
    }

    let model = params
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    debug!(%model, "generating AI content");

    let response = http_client()
        .post(format!("{}/chat/completions", config.api_base))
        .bearer_auth(api_key)
        .json(&json!({
            "model": model,
            "messages": [{"role": "user", "content": params.prompt}],
            "max_tokens": params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "temperature": params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        }))
        .send()
        .await?;

    let body: Value = expect_success("AI provider", response).await?.json().await?;

    let text = body["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let tokens_used = body["usage"]["total_tokens"]
        .as_u64()
        .unwrap_or(text.len() as u64);

    Ok(GeneratedContent {
        text,
        model,
        tokens_used,
    })
}
