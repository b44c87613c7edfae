//! Create or update a Vercel project environment variable.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const VERCEL_API_BASE: &str = "https://api.vercel.com";

fn default_targets() -> Vec<String> {
    vec![
        "production".to_string(),
        "preview".to_string(),
        "development".to_string(),
    ]
}

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
pub struct SetEnvVarParams {
    pub project_id: String,
    pub key: String,
    pub value: String,
    /// Deploy targets. Defaults to all three.
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
    /// "encrypted", "plain", or "sensitive". Defaults to "encrypted".
    #[serde(default)]
    pub var_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvVarResult {
    pub id: Option<String>,
    pub key: String,
    pub targets: Vec<String>,
}

/// Upsert an environment variable on a project.
pub async fn vercel_set_env_var(
    config: &VercelConfig,
    params: SetEnvVarParams,
) -> Result<EnvVarResult> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.project_id.is_empty() || params.key.is_empty() {
        return Err(Error::InvalidInput("project_id and key are required".into()));
    }

    let var_type = params.var_type.as_deref().unwrap_or("encrypted");

    let mut request = http_client()
        .post(format!(
            "{}/v10/projects/{}/env",
            config.api_base, params.project_id
        ))
        .bearer_auth(token)
        .query(&[("upsert", "true")])
        .json(&json!({
            "key": params.key,
            "value": params.value,
            "type": var_type,
            "target": params.targets,
        }));
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(project = %params.project_id, key = %params.key, "setting Vercel env var");

    let body: Value = expect_success("Vercel", request.send().await?)
        .await?
        .json()
        .await?;

    Ok(EnvVarResult {
        id: body["created"]["id"]
            .as_str()
            .or_else(|| body["id"].as_str())
            .map(str::to_string),
        key: params.key,
        targets: params.targets,
    })
}
