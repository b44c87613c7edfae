//! Create an issue on GitHub.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Personal access token.
    pub token: Option<String>,
    pub api_base: String,
}

impl GithubConfig {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("GITHUB_TOKEN").ok(),
            api_base: GITHUB_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssueParams {
    /// Repository owner (user or organization).
    pub owner: String,
    pub repo: String,
    pub title: String,
    /// Issue body, Markdown.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedIssue {
    pub number: Option<i64>,
    pub url: Option<String>,
    pub id: Option<i64>,
    pub state: Option<String>,
}

/// Create a GitHub issue.
pub async fn github_create_issue(
    config: &GithubConfig,
    params: CreateIssueParams,
) -> Result<CreatedIssue> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("GITHUB_TOKEN is not configured".into()))?;

    if params.owner.is_empty() || params.repo.is_empty() || params.title.is_empty() {
        return Err(Error::InvalidInput(
            "owner, repo, and title are required".into(),
        ));
    }

    debug!(owner = %params.owner, repo = %params.repo, "creating GitHub issue");

    let response = http_client()
        .post(format!(
            "{}/repos/{}/{}/issues",
            config.api_base, params.owner, params.repo
        ))
        .bearer_auth(token)
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "stepdeck")
        .json(&json!({
            "title": params.title,
            "body": params.body,
            "labels": params.labels,
        }))
        .send()
        .await?;

    let body: Value = expect_success("GitHub", response).await?.json().await?;

    Ok(CreatedIssue {
        number: body["number"].as_i64(),
        url: body["html_url"].as_str().map(str::to_string),
        id: body["id"].as_i64(),
        state: body["state"].as_str().map(str::to_string),
    })
}
