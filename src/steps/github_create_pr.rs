//! Open a pull request on GitHub.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GithubConfig {
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
pub struct CreatePrParams {
    pub owner: String,
    pub repo: String,
    pub title: String,
    /// Branch containing the changes.
    pub head: String,
    /// Branch to merge into.
    pub base: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedPr {
    pub number: Option<i64>,
    pub url: Option<String>,
    pub id: Option<i64>,
    pub state: Option<String>,
}

/// Open a pull request.
pub async fn github_create_pr(config: &GithubConfig, params: CreatePrParams) -> Result<CreatedPr> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("GITHUB_TOKEN is not configured".into()))?;

    if params.owner.is_empty()
        || params.repo.is_empty()
        || params.title.is_empty()
        || params.head.is_empty()
        || params.base.is_empty()
    {
        return Err(Error::InvalidInput(
            "owner, repo, title, head, and base are required".into(),
        ));
    }

    debug!(owner = %params.owner, repo = %params.repo, head = %params.head, "creating pull request");

    let response = http_client()
        .post(format!(
            "{}/repos/{}/{}/pulls",
            config.api_base, params.owner, params.repo
        ))
        .bearer_auth(token)
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "stepdeck")
        .json(&json!({
            "title": params.title,
            "head": params.head,
            "base": params.base,
            "body": params.body,
        }))
        .send()
        .await?;

    let body: Value = expect_success("GitHub", response).await?.json().await?;

    Ok(CreatedPr {
        number: body["number"].as_i64(),
        url: body["html_url"].as_str().map(str::to_string),
        id: body["id"].as_i64(),
        state: body["state"].as_str().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> CreatePrParams {
        CreatePrParams {
            owner: "octo".into(),
            repo: "widgets".into(),
            title: "Fix crash".into(),
            head: "fix/crash".into(),
            base: "main".into(),
            body: None,
        }
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let config = GithubConfig {
            token: None,
            api_base: unreachable(),
        };
        let err = github_create_pr(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn missing_branches_are_invalid() {
        let config = GithubConfig {
            token: Some("ghp_test".into()),
            api_base: unreachable(),
        };
        let mut p = params();
        p.base = String::new();
        let err = github_create_pr(&config, p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn validation_failure_is_fatal() {
        let config = GithubConfig {
            token: Some("ghp_test".into()),
            api_base: stub(422, serde_json::json!({"message": "Validation Failed"})).await,
        };
        let err = github_create_pr(&config, params()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let config = GithubConfig {
            token: Some("ghp_test".into()),
            api_base: stub(500, serde_json::json!({})).await,
        };
        let err = github_create_pr(&config, params()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn returns_pr_number() {
        let body = serde_json::json!({
            "number": 42,
            "html_url": "https://github.com/octo/widgets/pull/42",
            "id": 1000,
            "state": "open"
        });
        let config = GithubConfig {
            token: Some("ghp_test".into()),
            api_base: stub(201, body).await,
        };
        let pr = github_create_pr(&config, params()).await.unwrap();
        assert_eq!(pr.number, Some(42));
    }
}
