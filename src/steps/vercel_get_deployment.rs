//! Inspect a Vercel deployment.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const VERCEL_API_BASE: &str = "https://api.vercel.com";

#[derive(Debug, Clone)]
pub struct VercelConfig {
    pub token: Option<String>,
    pub team_id: Option<String>,
    pub api_base: String,
}

impl VercelConfig {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("VERCEL_TOKEN").ok(),
            team_id: std::env::var("VERCEL_TEAM_ID").ok(),
            api_base: VERCEL_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetDeploymentParams {
    /// Deployment ID or URL.
    pub deployment_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentDetails {
    pub id: Option<String>,
    pub url: Option<String>,
    pub state: Option<String>,
    pub target: Option<String>,
    pub created_at: Option<i64>,
    pub ready: Option<i64>,
}

/// Fetch status and metadata for one deployment.
pub async fn vercel_get_deployment(
    config: &VercelConfig,
    params: GetDeploymentParams,
) -> Result<DeploymentDetails> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.deployment_id.is_empty() {
        return Err(Error::InvalidInput("deployment_id is required".into()));
    }

    let mut request = http_client()
        .get(format!(
            "{}/v13/deployments/{}",
            config.api_base, params.deployment_id
        ))
        .bearer_auth(token);
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(deployment = %params.deployment_id, "fetching Vercel deployment");

    let body: Value = expect_success("Vercel", request.send().await?)
        .await?
        .json()
        .await?;

    Ok(DeploymentDetails {
        id: body["id"].as_str().map(str::to_string),
        url: body["url"].as_str().map(str::to_string),
        state: body["readyState"].as_str().map(str::to_string),
        target: body["target"].as_str().map(str::to_string),
        created_at: body["createdAt"].as_i64(),
        ready: body["ready"].as_i64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> GetDeploymentParams {
        GetDeploymentParams {
            deployment_id: "dpl_1".into(),
        }
    }

    fn config(api_base: String) -> VercelConfig {
        VercelConfig {
            token: Some("vc_test".into()),
            team_id: None,
            api_base,
        }
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let config = VercelConfig {
            token: None,
            team_id: None,
            api_base: unreachable(),
        };
        let err = vercel_get_deployment(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn unknown_deployment_is_fatal() {
        let base = stub(404, serde_json::json!({"error": {"code": "not_found"}})).await;
        let err = vercel_get_deployment(&config(base), params())
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let base = stub(502, serde_json::json!({})).await;
        let err = vercel_get_deployment(&config(base), params())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn returns_deployment_state() {
        let body = serde_json::json!({
            "id": "dpl_1", "url": "site-abc.vercel.app",
            "readyState": "READY", "target": "production",
            "createdAt": 1700000000000i64, "ready": 1700000100000i64
        });
        let base = stub(200, body).await;
        let details = vercel_get_deployment(&config(base), params()).await.unwrap();
        assert_eq!(details.state.as_deref(), Some("READY"));
        assert_eq!(details.created_at, Some(1700000000000));
    }
}
