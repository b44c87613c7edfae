//! Read a value from a Vercel Edge Config store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const VERCEL_API_BASE: &str = "https://api.vercel.com";

#[derive(Debug, Clone)]
pub struct EdgeConfigConfig {
    pub token: Option<String>,
    pub edge_config_id: Option<String>,
    pub team_id: Option<String>,
    pub api_base: String,
}

impl EdgeConfigConfig {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("VERCEL_TOKEN").ok(),
            edge_config_id: std::env::var("EDGE_CONFIG_ID").ok(),
            team_id: std::env::var("VERCEL_TEAM_ID").ok(),
            api_base: VERCEL_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeConfigGetParams {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeConfigItem {
    pub key: String,
    /// None when the key does not exist in the store.
    pub value: Option<Value>,
}

/// Look up one Edge Config item. A missing key is not an error.
pub async fn vercel_edge_config_get(
    config: &EdgeConfigConfig,
    params: EdgeConfigGetParams,
) -> Result<EdgeConfigItem> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;
    let edge_config_id = config
        .edge_config_id
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("EDGE_CONFIG_ID is not configured".into()))?;

    if params.key.is_empty() {
        return Err(Error::InvalidInput("key is required".into()));
    }

    let mut request = http_client()
        .get(format!(
            "{}/v1/edge-config/{}/item/{}",
            config.api_base, edge_config_id, params.key
        ))
        .bearer_auth(token);
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(key = %params.key, "reading Edge Config item");

    let response = request.send().await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(EdgeConfigItem {
            key: params.key,
            value: None,
        });
    }

    let body: Value = expect_success("Vercel", response).await?.json().await?;

    Ok(EdgeConfigItem {
        key: params.key,
        value: Some(body["value"].clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> EdgeConfigGetParams {
        EdgeConfigGetParams {
            key: "feature_flag".into(),
        }
    }

    fn config(api_base: String) -> EdgeConfigConfig {
        EdgeConfigConfig {
            token: Some("vc_test".into()),
            edge_config_id: Some("ecfg_1".into()),
            team_id: None,
            api_base,
        }
    }

    #[tokio::test]
    async fn missing_store_id_fails_before_any_request() {
        let config = EdgeConfigConfig {
            token: Some("vc_test".into()),
            edge_config_id: None,
            team_id: None,
            api_base: unreachable(),
        };
        let err = vercel_edge_config_get(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn missing_key_resolves_to_none() {
        let base = stub(404, serde_json::json!({"error": "not_found"})).await;
        let item = vercel_edge_config_get(&config(base), params()).await.unwrap();
        assert!(item.value.is_none());
        assert_eq!(item.key, "feature_flag");
    }

    #[tokio::test]
    async fn unauthorized_is_fatal() {
        let base = stub(401, serde_json::json!({"error": "unauthorized"})).await;
        let err = vercel_edge_config_get(&config(base), params())
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let base = stub(500, serde_json::json!({})).await;
        let err = vercel_edge_config_get(&config(base), params())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn returns_stored_value() {
        let base = stub(200, serde_json::json!({"value": true})).await;
        let item = vercel_edge_config_get(&config(base), params()).await.unwrap();
        assert_eq!(item.value, Some(serde_json::json!(true)));
    }
}
