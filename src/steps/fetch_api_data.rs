//! Fetch JSON from an external API.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Deserialize)]
pub struct FetchApiDataParams {
    pub url: String,
    /// "GET", "POST", "PUT", "DELETE" or "PATCH". Defaults to GET.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    /// Per-request timeout in milliseconds. A timeout aborts the single
    /// in-flight request and surfaces as a retryable error.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchedData {
    pub data: Value,
    pub status: u16,
    pub headers: HashMap<String, String>,
}

/// Fetch data from an external API.
///
/// 4xx responses are client errors and unrecoverable; 5xx responses and
/// timeouts are left to the external runtime to retry.
pub async fn fetch_api_data(params: FetchApiDataParams) -> Result<FetchedData> {
    if !params.url.starts_with("http") {
        return Err(Error::InvalidInput("invalid URL provided".into()));
    }

    let method = params.method.as_deref().unwrap_or("GET").to_uppercase();
    let mut request = match method.as_str() {
        "GET" => http_client().get(&params.url),
        "POST" => http_client().post(&params.url),
        "PUT" => http_client().put(&params.url),
        "DELETE" => http_client().delete(&params.url),
        "PATCH" => http_client().patch(&params.url),
        other => {
            return Err(Error::InvalidInput(format!(
                "unsupported HTTP method: {}",
                other
            )))
        }
    };

    request = request
        .timeout(Duration::from_millis(
            params.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        ))
        .header("Content-Type", "application/json");
    for (name, value) in &params.headers {
        request = request.header(name, value);
    }
    if let Some(body) = &params.body {
        request = request.json(body);
    }

    debug!(url = %params.url, %method, "fetching API data");

    let response = request.send().await?;
    let status = response.status().as_u16();
    let response = expect_success("API", response).await?;

    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();

    let data: Value = response.json().await?;

    Ok(FetchedData {
        data,
        status,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::stub;

    fn params(url: String) -> FetchApiDataParams {
        FetchApiDataParams {
            url,
            method: None,
            headers: HashMap::new(),
            body: None,
            timeout_ms: None,
        }
    }

    #[tokio::test]
    async fn non_http_url_is_invalid() {
        let err = fetch_api_data(params("ftp://example.com".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn client_error_is_fatal() {
        let base = stub(404, serde_json::json!({"error": "no such user"})).await;
        let err = fetch_api_data(params(base)).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "REJECTED");
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let base = stub(500, serde_json::json!({})).await;
        let err = fetch_api_data(params(base)).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn timeout_is_retryable() {
        // Nothing listens here; the connect failure maps to a retryable
        // transport error, same class as a timeout.
        let mut p = params("http://127.0.0.1:1".into());
        p.timeout_ms = Some(200);
        let err = fetch_api_data(p).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn returns_parsed_json_with_status() {
        let base = stub(200, serde_json::json!({"items": [1, 2, 3]})).await;
        let fetched = fetch_api_data(params(base)).await.unwrap();
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.data["items"][2], 3);
    }
}
