//! Create a Vercel deployment.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const VERCEL_API_BASE: &str = "https://api.vercel.com";

#[derive(Debug, Clone)]
pub struct VercelConfig {
    pub token: Option<String>,
    /// Team scope appended as `teamId` when set.
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
pub struct CreateDeploymentParams {
    pub project_id: String,
    /// Git branch, commit SHA, or tag. Defaults to "main".
    #[serde(default)]
    pub git_ref: Option<String>,
    /// "production" or "preview". Defaults to "preview".
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub id: Option<String>,
    pub url: Option<String>,
    pub ready_state: Option<String>,
    pub target: Option<String>,
}

/// Trigger a new deployment from a git ref.
pub async fn vercel_create_deployment(
    config: &VercelConfig,
    params: CreateDeploymentParams,
) -> Result<Deployment> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.project_id.is_empty() {
        return Err(Error::InvalidInput("project_id is required".into()));
    }

    let git_ref = params.git_ref.as_deref().unwrap_or("main");
    let target = params.target.as_deref().unwrap_or("preview");

    let mut request = http_client()
        .post(format!("{}/v13/deployments", config.api_base))
        .bearer_auth(token)
        .json(&json!({
            "name": params.project_id,
            "gitSource": {"ref": git_ref, "type": "github"},
            "target": target,
        }));
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(project = %params.project_id, %git_ref, %target, "creating Vercel deployment");

    let body: Value = expect_success("Vercel", request.send().await?)
        .await?
        .json()
        .await?;

    Ok(Deployment {
        id: body["id"].as_str().map(str::to_string),
        url: body["url"].as_str().map(str::to_string),
        ready_state: body["readyState"].as_str().map(str::to_string),
        target: body["target"].as_str().map(str::to_string),
    })
}
