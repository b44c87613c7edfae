//! Upload a file to Google Drive.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com";

#[derive(Debug, Clone)]
pub struct GoogleDriveConfig {
    pub api_key: Option<String>,
    pub api_base: String,
}

impl GoogleDriveConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_DRIVE_API_KEY").ok(),
            api_base: DRIVE_UPLOAD_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileParams {
    pub file_name: String,
    /// File body as text. Binary payloads go through base64 upstream of
    /// this step.
    pub file_content: String,
    pub mime_type: String,
    /// Optional parent folder ID.
    #[serde(default)]
    pub folder_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_view_link: Option<String>,
}

/// Upload a file using the Drive multipart upload endpoint.
pub async fn google_drive_upload_file(
    config: &GoogleDriveConfig,
    params: UploadFileParams,
) -> Result<UploadedFile> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("GOOGLE_DRIVE_API_KEY is not configured".into()))?;

    if params.file_name.is_empty() || params.file_content.is_empty() || params.mime_type.is_empty()
    {
        return Err(Error::InvalidInput(
            "file_name, file_content, and mime_type are required".into(),
        ));
    }

    let mut metadata = json!({"name": params.file_name});
    if let Some(folder_id) = &params.folder_id {
        metadata["parents"] = json!([folder_id]);
    }

    let form = Form::new()
        .part(
            "metadata",
            Part::text(metadata.to_string()).mime_str("application/json")?,
        )
        .part(
            "file",
            Part::text(params.file_content.clone()).mime_str(&params.mime_type)?,
        );

    debug!(file = %params.file_name, "uploading file to Google Drive");

    let response = http_client()
        .post(format!("{}/upload/drive/v3/files", config.api_base))
        .query(&[("uploadType", "multipart"), ("key", api_key)])
        .multipart(form)
        .send()
        .await?;

    let body: Value = expect_success("Google Drive", response).await?.json().await?;
    let id = body["id"].as_str().map(str::to_string);

    Ok(UploadedFile {
        web_view_link: id
            .as_deref()
            .map(|id| format!("https://drive.google.com/file/d/{}/view", id)),
        name: body["name"].as_str().map(str::to_string),
        id,
    })
}
