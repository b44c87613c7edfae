//! Send a message to a Discord channel via webhook.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::http_client;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Default webhook URL when the step gets none.
    pub webhook_url: Option<String>,
}

impl DiscordConfig {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("DISCORD_WEBHOOK_URL").ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendDiscordWebhookParams {
    /// Webhook URL; falls back to the configured default.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Rich embed objects for formatted messages.
    #[serde(default)]
    pub embeds: Option<Vec<Value>>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscordDelivery {
    pub success: bool,
    pub status: u16,
}

/// Send a message to Discord via webhook.
///
/// A missing or unknown webhook (404) and malformed payloads (400) are
/// unrecoverable; everything else follows the standard classification.
pub async fn send_discord_webhook(
    config: &DiscordConfig,
    params: SendDiscordWebhookParams,
) -> Result<DiscordDelivery> {
    let webhook_url = params
        .webhook_url
        .as_deref()
        .or(config.webhook_url.as_deref())
        .ok_or_else(|| Error::MissingConfig("DISCORD_WEBHOOK_URL is not configured".into()))?;

    let has_embeds = params.embeds.as_ref().is_some_and(|e| !e.is_empty());
    if params.content.is_none() && !has_embeds {
        return Err(Error::InvalidInput(
            "either content or embeds is required".into(),
        ));
    }

    debug!("sending Discord webhook");

    let response = http_client()
        .post(webhook_url)
        .json(&json!({
            "content": params.content,
            "embeds": params.embeds,
            "username": params.username,
            "avatar_url": params.avatar_url,
        }))
        .send()
        .await?;

    let status = response.status().as_u16();
    let response = super::expect_success("Discord", response).await?;

    Ok(DiscordDelivery {
        success: response.status().is_success(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params(url: String) -> SendDiscordWebhookParams {
        SendDiscordWebhookParams {
            webhook_url: Some(url),
            content: Some("release shipped".into()),
            embeds: None,
            username: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn missing_webhook_url_fails_before_any_request() {
        let config = DiscordConfig { webhook_url: None };
        let p = SendDiscordWebhookParams {
            webhook_url: None,
            content: Some("hi".into()),
            embeds: None,
            username: None,
            avatar_url: None,
        };
        let err = send_discord_webhook(&config, p).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn empty_message_is_invalid() {
        let config = DiscordConfig { webhook_url: None };
        let p = params(unreachable());
        let p = SendDiscordWebhookParams { content: None, ..p };
        let err = send_discord_webhook(&config, p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn unknown_webhook_is_fatal() {
        let base = stub(404, serde_json::json!({"message": "Unknown Webhook"})).await;
        let config = DiscordConfig { webhook_url: None };
        let err = send_discord_webhook(&config, params(base)).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let base = stub(500, serde_json::json!({})).await;
        let config = DiscordConfig { webhook_url: None };
        let err = send_discord_webhook(&config, params(base)).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn delivery_reports_status() {
        let base = stub(204, serde_json::json!(null)).await;
        let config = DiscordConfig { webhook_url: None };
        let delivery = send_discord_webhook(&config, params(base)).await.unwrap();
        assert!(delivery.success);
        assert_eq!(delivery.status, 204);
    }
}
