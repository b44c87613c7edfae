//! Send a signed webhook notification to an arbitrary endpoint.

use ring::hmac;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Default HMAC signing secret when the step gets none.
    pub secret: Option<String>,
}

impl WebhookConfig {
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("WEBHOOK_SECRET").ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendWebhookParams {
    pub url: String,
    pub payload: Value,
    /// "POST", "PUT" or "PATCH".
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Overrides the configured signing secret.
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub status: u16,
    pub data: Value,
}

fn hex_digest(tag: &hmac::Tag) -> String {
    tag.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
}

/// Deliver a JSON payload to a webhook endpoint, optionally signing the
/// body with HMAC-SHA256 in an `X-Webhook-Signature` header.
pub async fn send_webhook(
    config: &WebhookConfig,
    params: SendWebhookParams,
) -> Result<WebhookResponse> {
    if params.url.is_empty() {
        return Err(Error::InvalidInput("url is required".into()));
    }
    if params.payload.is_null() {
        return Err(Error::InvalidInput("payload is required".into()));
    }

    let method = params.method.as_deref().unwrap_or("POST").to_uppercase();
    let body = serde_json::to_string(&params.payload)?;

    let mut request = match method.as_str() {
        "POST" => http_client().post(&params.url),
        "PUT" => http_client().put(&params.url),
        "PATCH" => http_client().patch(&params.url),
        other => {
            return Err(Error::InvalidInput(format!(
                "unsupported webhook method: {}",
                other
            )))
        }
    };

    request = request.header("Content-Type", "application/json");
    for (name, value) in &params.headers {
        request = request.header(name, value);
    }

    if let Some(secret) = params.secret.as_deref().or(config.secret.as_deref()) {
        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        let signature = hex_digest(&hmac::sign(&key, body.as_bytes()));
        request = request.header("X-Webhook-Signature", signature);
    }

    debug!(url = %params.url, %method, "sending webhook");

    let response = request.body(body).send().await?;
    let status = response.status().as_u16();
    let response = expect_success("Webhook", response).await?;

    let text = response.text().await?;
    let data = serde_json::from_str(&text).unwrap_or(Value::String(text));

    Ok(WebhookResponse { status, data })
}
