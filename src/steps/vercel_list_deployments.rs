//! List deployments for a Vercel project.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const VERCEL_API_BASE: &str = "https://api.vercel.com";
const DEFAULT_LIMIT: u32 = 20;

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
pub struct ListDeploymentsParams {
    /// Project ID or name.
    pub project_id: String,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Filter: "BUILDING", "ERROR", "INITIALIZING", "QUEUED", "READY",
    /// or "CANCELED".
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub state: Option<String>,
    pub target: Option<String>,
    pub created_at: Option<i64>,
}

/// List recent deployments, newest first.
pub async fn vercel_list_deployments(
    config: &VercelConfig,
    params: ListDeploymentsParams,
) -> Result<Vec<DeploymentSummary>> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.project_id.is_empty() {
        return Err(Error::InvalidInput("project_id is required".into()));
    }

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).to_string();
    let mut query: Vec<(&str, &str)> = vec![("projectId", &params.project_id), ("limit", &limit)];
    if let Some(team_id) = &config.team_id {
        query.push(("teamId", team_id));
    }
    if let Some(state) = &params.state {
        query.push(("state", state));
    }

    debug!(project = %params.project_id, "listing Vercel deployments");

    let response = http_client()
        .get(format!("{}/v6/deployments", config.api_base))
        .bearer_auth(token)
        .query(&query)
        .send()
        .await?;

    let body: Value = expect_success("Vercel", response).await?.json().await?;

    let deployments = body["deployments"]
        .as_array()
        .map(|deployments| {
            deployments
                .iter()
                .map(|d| DeploymentSummary {
                    id: d["uid"].as_str().map(str::to_string),
                    name: d["name"].as_str().map(str::to_string),
                    url: d["url"].as_str().map(str::to_string),
                    state: d["readyState"].as_str().map(str::to_string),
                    target: d["target"].as_str().map(str::to_string),
                    created_at: d["createdAt"].as_i64(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(deployments)
}
