//! Send a message to a Slack channel.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack step configuration, resolved once at the call boundary.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot User OAuth token.
    pub bot_token: Option<String>,
    /// API base URL, overridable for tests.
    pub api_base: String,
}

impl SlackConfig {
    pub fn from_env() -> Self {
        Self {
            bot_token: std::env::var("SLACK_BOT_TOKEN").ok(),
            api_base: SLACK_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendSlackMessageParams {
    /// Channel ID or name (e.g. "#general").
    pub channel: String,
    /// Message text.
    pub text: String,
    /// Optional Block Kit blocks for rich formatting.
    #[serde(default)]
    pub blocks: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    pub ok: bool,
    pub message_ts: Option<String>,
    pub channel: Option<String>,
}

/// Send a message to a Slack channel.
///
/// Invalid tokens and unknown channels are unrecoverable; rate limits and
/// network faults propagate as retryable errors for the workflow runtime.
pub async fn send_slack_message(
    config: &SlackConfig,
    params: SendSlackMessageParams,
) -> Result<SlackMessage> {
    let token = config
        .bot_token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("SLACK_BOT_TOKEN is not configured".into()))?;

    if params.channel.is_empty() || params.text.is_empty() {
        return Err(Error::InvalidInput("channel and text are required".into()));
    }

    debug!(channel = %params.channel, "sending Slack message");

    let response = http_client()
        .post(format!("{}/chat.postMessage", config.api_base))
        .bearer_auth(token)
        .json(&json!({
            "channel": params.channel,
            "text": params.text,
            "blocks": params.blocks,
        }))
        .send()
        .await?;

    let body: Value = expect_success("Slack", response).await?.json().await?;

    // Slack reports failures inside a 200 body.
    if !body["ok"].as_bool().unwrap_or(false) {
        let reason = body["error"].as_str().unwrap_or("unknown_error").to_string();
        return match reason.as_str() {
            "invalid_auth" | "account_inactive" | "not_in_channel" | "channel_not_found" => {
                Err(Error::Rejected {
                    service: "Slack".into(),
                    status: 200,
                    message: reason,
                })
            }
            _ => Err(Error::Upstream {
                service: "Slack".into(),
                status: 200,
                message: reason,
            }),
        };
    }

    Ok(SlackMessage {
        ok: true,
        message_ts: body["ts"].as_str().map(str::to_string),
        channel: body["channel"].as_str().map(str::to_string),
    })
}
