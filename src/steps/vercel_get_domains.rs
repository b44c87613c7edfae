//! List the domains attached to a Vercel project.

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
pub struct GetDomainsParams {
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDomain {
    pub name: Option<String>,
    pub verified: bool,
    pub primary: bool,
    pub redirect: Option<String>,
    pub redirect_status_code: Option<i64>,
}

/// List custom domains configured for a project.
pub async fn vercel_get_domains(
    config: &VercelConfig,
    params: GetDomainsParams,
) -> Result<Vec<ProjectDomain>> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("VERCEL_TOKEN is not configured".into()))?;

    if params.project_id.is_empty() {
        return Err(Error::InvalidInput("project_id is required".into()));
    }

    let mut request = http_client()
        .get(format!(
            "{}/v9/projects/{}/domains",
            config.api_base, params.project_id
        ))
        .bearer_auth(token);
    if let Some(team_id) = &config.team_id {
        request = request.query(&[("teamId", team_id)]);
    }

    debug!(project = %params.project_id, "listing Vercel domains");

    let body: Value = expect_success("Vercel", request.send().await?)
        .await?
        .json()
        .await?;

    let domains = body["domains"]
        .as_array()
        .map(|domains| {
            domains
                .iter()
                .map(|d| ProjectDomain {
                    name: d["name"].as_str().map(str::to_string),
                    verified: d["verified"].as_bool().unwrap_or(false),
                    primary: d["primary"].as_bool().unwrap_or(false),
                    redirect: d["redirect"].as_str().map(str::to_string),
                    redirect_status_code: d["redirectStatusCode"].as_i64(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(domains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> GetDomainsParams {
        GetDomainsParams {
            project_id: "site".into(),
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
        let err = vercel_get_domains(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn unknown_project_is_fatal() {
        let base = stub(404, serde_json::json!({"error": {"code": "not_found"}})).await;
        let err = vercel_get_domains(&config(base), params()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let base = stub(500, serde_json::json!({})).await;
        let err = vercel_get_domains(&config(base), params()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn maps_domain_flags() {
        let body = serde_json::json!({
            "domains": [
                {"name": "example.com", "verified": true, "primary": true},
                {"name": "www.example.com", "verified": true,
                 "redirect": "example.com", "redirectStatusCode": 308}
            ]
        });
        let base = stub(200, body).await;
        let domains = vercel_get_domains(&config(base), params()).await.unwrap();
        assert_eq!(domains.len(), 2);
        assert!(domains[0].primary);
        assert_eq!(domains[1].redirect.as_deref(), Some("example.com"));
        assert_eq!(domains[1].redirect_status_code, Some(308));
    }
}
