//! Cancel an in-progress Vercel deployment.

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
pub struct CancelDeploymentParams {
    pub deployment_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelledDeployment {
    pub deployment_id: String,
    pub cancelled: bool,
    pub state: Option<String>,
}

/// Cancel a queued or building deployment.
pub async fn vercel_cancel_deployment(
    config: &VercelConfig,
    params: CancelDeploymentParams,
) -> Result<CancelledDeployment> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.deployment_id.is_empty() {
        return Err(Error::InvalidInput("deployment_id is required".into()));
    }

    let mut request = http_client()
        .patch(format!(
            "{}/v12/deployments/{}/cancel",
            config.api_base, params.deployment_id
        ))
        .bearer_auth(token);
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(deployment = %params.deployment_id, "cancelling Vercel deployment");

    let body: Value = expect_success("Vercel", request.send().await?)
        .await?
        .json()
        .await?;

    Ok(CancelledDeployment {
        deployment_id: params.deployment_id,
        cancelled: true,
        state: body["readyState"].as_str().map(str::to_string),
    })
}
