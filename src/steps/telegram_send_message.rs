//! Send a message via a Telegram bot.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: Option<String>,
    pub api_base: String,
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        Self {
            bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSendMessageParams {
    /// Chat ID (user, group, or channel).
    pub chat_id: String,
    /// Message text, Markdown or HTML depending on `parse_mode`.
    pub text: String,
    /// "Markdown" or "HTML".
    #[serde(default)]
    pub parse_mode: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TelegramMessage {
    pub message_id: Option<i64>,
    pub chat_id: Option<i64>,
    pub date: Option<i64>,
}

/// Send a message through the Telegram Bot API.
pub async fn telegram_send_message(
    config: &TelegramConfig,
    params: TelegramSendMessageParams,
) -> Result<TelegramMessage> {
    let bot_token = config
        .bot_token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("TELEGRAM_BOT_TOKEN is not configured".into()))?;

    if params.chat_id.is_empty() || params.text.is_empty() {
        return Err(Error::InvalidInput("chat_id and text are required".into()));
    }

    debug!(chat_id = %params.chat_id, "sending Telegram message");

    let response = http_client()
        .post(format!(
            "{}/bot{}/sendMessage",
            config.api_base, bot_token
        ))
        .json(&json!({
            "chat_id": params.chat_id,
            "text": params.text,
            "parse_mode": params.parse_mode,
        }))
        .send()
        .await?;

    let body: Value = expect_success("Telegram", response).await?.json().await?;
    let result = &body["result"];

    Ok(TelegramMessage {
        message_id: result["message_id"].as_i64(),
        chat_id: result["chat"]["id"].as_i64(),
        date: result["date"].as_i64(),
    })
}
