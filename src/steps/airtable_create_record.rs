//! Create a record in an Airtable table.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const AIRTABLE_API_BASE: &str = "https://api.airtable.com";

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    /// Personal access token.
    pub api_key: Option<String>,
    pub api_base: String,
}

impl AirtableConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("AIRTABLE_API_KEY").ok(),
            api_base: AIRTABLE_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordParams {
    pub base_id: String,
    /// Table name or ID.
    pub table_id: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedRecord {
    pub id: Option<String>,
    pub fields: Value,
    pub created_time: Option<String>,
}

/// Create an Airtable record.
pub async fn airtable_create_record(
    config: &AirtableConfig,
    params: CreateRecordParams,
) -> Result<CreatedRecord> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("AIRTABLE_API_KEY is not configured".into()))?;

    if params.base_id.is_empty() || params.table_id.is_empty() || params.fields.is_empty() {
        return Err(Error::InvalidInput(
            "base_id, table_id, and fields are required".into(),
        ));
    }

    debug!(base = %params.base_id, table = %params.table_id, "creating Airtable record");

    let response = http_client()
        .post(format!(
            "{}/v0/{}/{}",
            config.api_base,
            params.base_id,
            urlencoding::encode(&params.table_id)
        ))
        .bearer_auth(api_key)
        .json(&json!({"fields": params.fields}))
        .send()
        .await?;

    let body: Value = expect_success("Airtable", response).await?.json().await?;

    Ok(CreatedRecord {
        id: body["id"].as_str().map(str::to_string),
        fields: body["fields"].clone(),
        created_time: body["createdTime"].as_str().map(str::to_string),
    })
}
