//! Purge a Vercel project's data cache.

use serde::{Deserialize, Serialize};
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
pub struct PurgeCacheParams {
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurgedCache {
    pub project_id: String,
    pub cache_purged: bool,
}

/// Invalidate the project's data cache.
pub async fn vercel_purge_cache(
    config: &VercelConfig,
    params: PurgeCacheParams,
) -> Result<PurgedCache> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.project_id.is_empty() {
        return Err(Error::InvalidInput("project_id is required".into()));
    }

    let mut request = http_client()
        .delete(format!(
            "{}/v1/data-cache/purge-all",
            config.api_base
        ))
        .bearer_auth(token)
        .query(&[("projectIdOrName", &params.project_id)]);
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(project = %params.project_id, "purging Vercel cache");

    expect_success("Vercel", request.send().await?).await?;

    Ok(PurgedCache {
        project_id: params.project_id,
        cache_purged: true,
    })
}
