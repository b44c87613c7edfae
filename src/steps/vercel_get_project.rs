//! Fetch a Vercel project's settings.

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
pub struct GetProjectParams {
    /// Project ID or name.
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: Option<String>,
    pub name: Option<String>,
    pub framework: Option<String>,
    pub dev_command: Option<String>,
    pub build_command: Option<String>,
    pub output_directory: Option<String>,
    pub updated_at: Option<i64>,
}

/// Fetch project metadata and build settings.
pub async fn vercel_get_project(
    config: &VercelConfig,
    params: GetProjectParams,
) -> Result<Project> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.project_id.is_empty() {
        return Err(Error::InvalidInput("project_id is required".into()));
    }

    let mut request = http_client()
        .get(format!(
            "{}/v9/projects/{}",
            config.api_base, params.project_id
        ))
        .bearer_auth(token);
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(project = %params.project_id, "fetching Vercel project");

    let body: Value = expect_success("Vercel", request.send().await?)
        .await?
        .json()
        .await?;

    Ok(Project {
        id: body["id"].as_str().map(str::to_string),
        name: body["name"].as_str().map(str::to_string),
        framework: body["framework"].as_str().map(str::to_string),
        dev_command: body["devCommand"].as_str().map(str::to_string),
        build_command: body["buildCommand"].as_str().map(str::to_string),
        output_directory: body["outputDirectory"].as_str().map(str::to_string),
        updated_at: body["updatedAt"].as_i64(),
    })
}
