//! Send a transactional email via Resend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const RESEND_API_BASE: &str = "https://api.resend.com";
const DEFAULT_FROM: &str = "noreply@example.com";

#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// Resend API key.
    pub api_key: Option<String>,
    /// Default sender address when the step gets none.
    pub default_from: String,
    pub api_base: String,
}

impl ResendConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("RESEND_API_KEY").ok(),
            default_from: std::env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| DEFAULT_FROM.to_string()),
            api_base: RESEND_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailParams {
    /// Recipient address(es).
    pub to: Vec<String>,
    pub subject: String,
    /// HTML body.
    pub html: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentEmail {
    pub id: Option<String>,
    pub success: bool,
}

/// Send a transactional email using Resend.
pub async fn send_email(config: &ResendConfig, params: SendEmailParams) -> Result<SentEmail> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("RESEND_API_KEY is not configured".into()))?;

    if params.to.is_empty() || params.subject.is_empty() {
        return Err(Error::InvalidInput("to and subject are required".into()));
    }

    let from = params
        .from
        .clone()
        .unwrap_or_else(|| config.default_from.clone());

    debug!(recipients = params.to.len(), "sending email via Resend");

    let response = http_client()
        .post(format!("{}/emails", config.api_base))
        .bearer_auth(api_key)
        .json(&json!({
            "from": from,
            "to": params.to,
            "subject": params.subject,
            "html": params.html,
            "reply_to": params.reply_to,
        }))
        .send()
        .await?;

    let body: Value = expect_success("Resend", response).await?.json().await?;

    Ok(SentEmail {
        id: body["id"].as_str().map(str::to_string),
        success: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> SendEmailParams {
        SendEmailParams {
            to: vec!["user@example.com".into()],
            subject: "Welcome".into(),
            html: "<h1>Hello</h1>".into(),
            from: None,
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let config = ResendConfig {
            api_key: None,
            default_from: DEFAULT_FROM.into(),
            api_base: unreachable(),
        };
        let err = send_email(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn unauthorized_is_fatal() {
        let config = ResendConfig {
            api_key: Some("re_test".into()),
            default_from: DEFAULT_FROM.into(),
            api_base: stub(401, serde_json::json!({"message": "invalid key"})).await,
        };
        let err = send_email(&config, params()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let config = ResendConfig {
            api_key: Some("re_test".into()),
            default_from: DEFAULT_FROM.into(),
            api_base: stub(503, serde_json::json!({})).await,
        };
        let err = send_email(&config, params()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn returns_message_id() {
        let config = ResendConfig {
            api_key: Some("re_test".into()),
            default_from: DEFAULT_FROM.into(),
            api_base: stub(200, serde_json::json!({"id": "email_123"})).await,
        };
        let sent = send_email(&config, params()).await.unwrap();
        assert_eq!(sent.id.as_deref(), Some("email_123"));
        assert!(sent.success);
    }
}
