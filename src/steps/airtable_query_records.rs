//! Query records from an Airtable table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const AIRTABLE_API_BASE: &str = "https://api.airtable.com";
const DEFAULT_MAX_RECORDS: u32 = 100;

#[derive(Debug, Clone)]
pub struct AirtableConfig {
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
pub struct QueryRecordsParams {
    pub base_id: String,
    pub table_id: String,
    /// Airtable formula for filtering, e.g. `{Status} = 'Open'`.
    #[serde(default)]
    pub filter_by_formula: Option<String>,
    #[serde(default)]
    pub max_records: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AirtableRecord {
    pub id: Option<String>,
    pub fields: Value,
    pub created_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueriedRecords {
    pub records: Vec<AirtableRecord>,
}

/// Query Airtable records with optional formula filtering.
pub async fn airtable_query_records(
    config: &AirtableConfig,
    params: QueryRecordsParams,
) -> Result<QueriedRecords> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("AIRTABLE_API_KEY is not configured".into()))?;

    if params.base_id.is_empty() || params.table_id.is_empty() {
        return Err(Error::InvalidInput(
            "base_id and table_id are required".into(),
        ));
    }

    let max_records = params.max_records.unwrap_or(DEFAULT_MAX_RECORDS).to_string();
    let mut query: Vec<(&str, &str)> = vec![("maxRecords", &max_records)];
    if let Some(formula) = &params.filter_by_formula {
        query.push(("filterByFormula", formula));
    }

    debug!(base = %params.base_id, table = %params.table_id, "querying Airtable records");

    let response = http_client()
        .get(format!(
            "{}/v0/{}/{}",
            config.api_base,
            params.base_id,
            urlencoding::encode(&params.table_id)
        ))
        .bearer_auth(api_key)
        .query(&query)
        .send()
        .await?;

    let body: Value = expect_success("Airtable", response).await?.json().await?;

    let records = body["records"]
        .as_array()
        .map(|records| {
            records
                .iter()
                .map(|record| AirtableRecord {
                    id: record["id"].as_str().map(str::to_string),
                    fields: record["fields"].clone(),
                    created_time: record["createdTime"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(QueriedRecords { records })
}
