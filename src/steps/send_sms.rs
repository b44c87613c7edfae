//! Send an SMS via Twilio.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Default sender number when the step gets none.
    pub from_number: Option<String>,
    pub api_base: String,
}

impl TwilioConfig {
    pub fn from_env() -> Self {
        Self {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok(),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok(),
            from_number: std::env::var("TWILIO_PHONE_NUMBER").ok(),
            api_base: TWILIO_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendSmsParams {
    /// Recipient number in E.164 format.
    pub to: String,
    pub message: String,
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentSms {
    pub sid: Option<String>,
    pub status: Option<String>,
    pub to: Option<String>,
    pub from: Option<String>,
}

fn is_e164(number: &str) -> bool {
    // E.164: optional +, no leading zero, at most 15 digits.
    static PATTERN: &str = r"^\+?[1-9][0-9]{1,14}$";
    Regex::new(PATTERN).map(|re| re.is_match(number)).unwrap_or(false)
}

/// Send an SMS message using the Twilio REST API (basic auth, form body).
pub async fn send_sms(config: &TwilioConfig, params: SendSmsParams) -> Result<SentSms> {
    let (account_sid, auth_token) = match (&config.account_sid, &config.auth_token) {
        (Some(sid), Some(token)) => (sid.as_str(), token.as_str()),
        _ => {
            return Err(Error::MissingConfig(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN are required".into(),
            ))
        }
    };

    let from = params
        .from
        .as_deref()
        .or(config.from_number.as_deref())
        .ok_or_else(|| {
            Error::MissingConfig(
                "from number is required (parameter or TWILIO_PHONE_NUMBER)".into(),
            )
        })?;

    if !is_e164(&params.to) {
        return Err(Error::InvalidInput(format!(
            "invalid recipient phone number: {}",
            params.to
        )));
    }

    debug!(to = %params.to, "sending SMS via Twilio");

    let response = http_client()
        .post(format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base, account_sid
        ))
        .basic_auth(account_sid, Some(auth_token))
        .form(&[
            ("To", params.to.as_str()),
            ("From", from),
            ("Body", params.message.as_str()),
        ])
        .send()
        .await?;

    let body: Value = expect_success("Twilio", response).await?.json().await?;

    Ok(SentSms {
        sid: body["sid"].as_str().map(str::to_string),
        status: body["status"].as_str().map(str::to_string),
        to: body["to"].as_str().map(str::to_string),
        from: body["from"].as_str().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn config(api_base: String) -> TwilioConfig {
        TwilioConfig {
            account_sid: Some("AC123".into()),
            auth_token: Some("secret".into()),
            from_number: Some("+15550001111".into()),
            api_base,
        }
    }

    fn params() -> SendSmsParams {
        SendSmsParams {
            to: "+15557772222".into(),
            message: "code 123456".into(),
            from: None,
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let config = TwilioConfig {
            account_sid: None,
            auth_token: None,
            from_number: None,
            api_base: unreachable(),
        };
        let err = send_sms(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn invalid_phone_number_is_fatal() {
        let mut p = params();
        p.to = "not-a-number".into();
        let err = send_sms(&config(unreachable()), p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn unauthorized_is_fatal() {
        let base = stub(401, serde_json::json!({"message": "Authenticate"})).await;
        let err = send_sms(&config(base), params()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let base = stub(500, serde_json::json!({})).await;
        let err = send_sms(&config(base), params()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn returns_message_sid() {
        let body = serde_json::json!({
            "sid": "SM1", "status": "queued", "to": "+15557772222", "from": "+15550001111"
        });
        let base = stub(201, body).await;
        let sent = send_sms(&config(base), params()).await.unwrap();
        assert_eq!(sent.sid.as_deref(), Some("SM1"));
        assert_eq!(sent.status.as_deref(), Some("queued"));
    }

    #[test]
    fn e164_validation() {
        assert!(is_e164("+15551234567"));
        assert!(is_e164("4479460000"));
        assert!(!is_e164("0123"));
        assert!(!is_e164("+1 555 123"));
    }
}
