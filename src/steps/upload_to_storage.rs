//! Upload content to the blob storage service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const BLOB_API_BASE: &str = "https://blob.vercel-storage.com";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub token: Option<String>,
    pub api_base: String,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("BLOB_READ_WRITE_TOKEN").ok(),
            api_base: BLOB_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadParams {
    pub filename: String,
    pub content: String,
    /// MIME type of the content. Defaults to "text/plain".
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredBlob {
    pub url: Option<String>,
    pub pathname: Option<String>,
    pub content_type: String,
    pub size: usize,
}

/// Store the content under the given filename and return its public URL.
pub async fn upload_to_storage(
    config: &StorageConfig,
    params: UploadParams,
) -> Result<StoredBlob> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("BLOB_READ_WRITE_TOKEN is not configured".into()))?;

    if params.filename.is_empty() || params.content.is_empty() {
        return Err(Error::InvalidInput(
            "filename and content are required".into(),
        ));
    }

    let content_type = params
        .content_type
        .clone()
        .unwrap_or_else(|| "text/plain".to_string());
    let size = params.content.len();

    debug!(file = %params.filename, size, "uploading blob");

    let response = http_client()
        .put(format!("{}/{}", config.api_base, params.filename))
        .bearer_auth(token)
        .header("x-content-type", &content_type)
        .body(params.content)
        .send()
        .await?;

    let body: Value = expect_success("blob storage", response).await?.json().await?;

    Ok(StoredBlob {
        url: body["url"].as_str().map(str::to_string),
        pathname: body["pathname"].as_str().map(str::to_string),
        content_type,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> UploadParams {
        UploadParams {
            filename: "report.txt".into(),
            content: "quarterly numbers".into(),
            content_type: None,
        }
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let config = StorageConfig {
            token: None,
            api_base: unreachable(),
        };
        let err = upload_to_storage(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn empty_content_is_invalid() {
        let config = StorageConfig {
            token: Some("blob_rw".into()),
            api_base: unreachable(),
        };
        let mut p = params();
        p.content = String::new();
        let err = upload_to_storage(&config, p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn unauthorized_is_fatal() {
        let config = StorageConfig {
            token: Some("blob_rw".into()),
            api_base: stub(403, serde_json::json!({"error": "forbidden"})).await,
        };
        let err = upload_to_storage(&config, params()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let config = StorageConfig {
            token: Some("blob_rw".into()),
            api_base: stub(500, serde_json::json!({})).await,
        };
        let err = upload_to_storage(&config, params()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn returns_public_url() {
        let body = serde_json::json!({
            "url": "https://blob.example.com/report.txt",
            "pathname": "report.txt"
        });
        let config = StorageConfig {
            token: Some("blob_rw".into()),
            api_base: stub(200, body).await,
        };
        let blob = upload_to_storage(&config, params()).await.unwrap();
        assert_eq!(blob.pathname.as_deref(), Some("report.txt"));
        assert_eq!(blob.content_type, "text/plain");
        assert_eq!(blob.size, "quarterly numbers".len());
    }
}
