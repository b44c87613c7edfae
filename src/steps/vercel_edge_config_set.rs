//! Write a value into a Vercel Edge Config store.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
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
pub struct EdgeConfigSetParams {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeConfigWrite {
    pub key: String,
    pub success: bool,
}

/// Upsert one Edge Config item.
pub async fn vercel_edge_config_set(
    config: &EdgeConfigConfig,
    params: EdgeConfigSetParams,
) -> Result<EdgeConfigWrite> {
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
        .patch(format!(
            "{}/v1/edge-config/{}/items",
            config.api_base, edge_config_id
        ))
        .bearer_auth(token)
        .json(&json!({
            "items": [{
                "operation": "upsert",
                "key": params.key,
                "value": params.value,
            }]
        }));
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(key = %params.key, "writing Edge Config item");

    expect_success("Vercel", request.send().await?).await?;

    Ok(EdgeConfigWrite {
        key: params.key,
        success: true,
    })
}
