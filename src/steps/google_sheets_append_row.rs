//! Append a row to a Google Sheet.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub api_key: Option<String>,
    pub api_base: String,
}

impl GoogleSheetsConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_SHEETS_API_KEY").ok(),
            api_base: SHEETS_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppendRowParams {
    /// Spreadsheet ID from the sheet URL.
    pub spreadsheet_id: String,
    /// Sheet (tab) name.
    pub sheet_name: String,
    /// Cell values to append as one row.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppendedRow {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u64>,
}

/// Append one row to a sheet via the Sheets values API.
pub async fn google_sheets_append_row(
    config: &GoogleSheetsConfig,
    params: AppendRowParams,
) -> Result<AppendedRow> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("GOOGLE_SHEETS_API_KEY is not configured".into()))?;

    if params.spreadsheet_id.is_empty() || params.sheet_name.is_empty() || params.values.is_empty()
    {
        return Err(Error::InvalidInput(
            "spreadsheet_id, sheet_name, and values are required".into(),
        ));
    }

    let range = format!("{}!A:Z", params.sheet_name);

    debug!(spreadsheet = %params.spreadsheet_id, sheet = %params.sheet_name, "appending sheet row");

    let response = http_client()
        .post(format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            config.api_base,
            params.spreadsheet_id,
            urlencoding::encode(&range)
        ))
        .query(&[("valueInputOption", "USER_ENTERED"), ("key", api_key)])
        .json(&json!({"values": [params.values]}))
        .send()
        .await?;

    let body: Value = expect_success("Google Sheets", response).await?.json().await?;

    Ok(AppendedRow {
        updated_range: body["updates"]["updatedRange"].as_str().map(str::to_string),
        updated_rows: body["updates"]["updatedRows"].as_u64(),
    })
}
