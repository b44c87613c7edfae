//! Read rows from a Google Sheet.

use serde::{Deserialize, Serialize};
use serde_json::Value;
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
pub struct ReadRowsParams {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Cell range like "A1:D10"; defaults to the whole sheet.
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetRows {
    pub range: Option<String>,
    pub values: Vec<Vec<Value>>,
}

/// Read cell values from a sheet.
pub async fn google_sheets_read_rows(
    config: &GoogleSheetsConfig,
    params: ReadRowsParams,
) -> Result<SheetRows> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("GOOGLE_SHEETS_API_KEY is not configured".into()))?;

    if params.spreadsheet_id.is_empty() || params.sheet_name.is_empty() {
        return Err(Error::InvalidInput(
            "spreadsheet_id and sheet_name are required".into(),
        ));
    }

    let full_range = match &params.range {
        Some(range) => format!("{}!{}", params.sheet_name, range),
        None => params.sheet_name.clone(),
    };

    debug!(spreadsheet = %params.spreadsheet_id, range = %full_range, "reading sheet rows");

    let response = http_client()
        .get(format!(
            "{}/v4/spreadsheets/{}/values/{}",
            config.api_base,
            params.spreadsheet_id,
            urlencoding::encode(&full_range)
        ))
        .query(&[("key", api_key)])
        .send()
        .await?;

    let body: Value = expect_success("Google Sheets", response).await?.json().await?;

    let values = body["values"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| row.as_array().cloned().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    Ok(SheetRows {
        range: body["range"].as_str().map(str::to_string),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> ReadRowsParams {
        ReadRowsParams {
            spreadsheet_id: "sheet123".into(),
            sheet_name: "Orders".into(),
            range: Some("A1:B2".into()),
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let config = GoogleSheetsConfig {
            api_key: None,
            api_base: unreachable(),
        };
        let err = google_sheets_read_rows(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn unknown_spreadsheet_is_fatal() {
        let config = GoogleSheetsConfig {
            api_key: Some("key".into()),
            api_base: stub(404, serde_json::json!({"error": {"status": "NOT_FOUND"}})).await,
        };
        let err = google_sheets_read_rows(&config, params()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let config = GoogleSheetsConfig {
            api_key: Some("key".into()),
            api_base: stub(500, serde_json::json!({})).await,
        };
        let err = google_sheets_read_rows(&config, params()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn missing_values_default_to_empty() {
        let body = serde_json::json!({"range": "Orders!A1:B2"});
        let config = GoogleSheetsConfig {
            api_key: Some("key".into()),
            api_base: stub(200, body).await,
        };
        let rows = google_sheets_read_rows(&config, params()).await.unwrap();
        assert!(rows.values.is_empty());
        assert_eq!(rows.range.as_deref(), Some("Orders!A1:B2"));
    }

    #[tokio::test]
    async fn returns_row_values() {
        let body = serde_json::json!({
            "range": "Orders!A1:B2",
            "values": [["date", "total"], ["2024-06-01", "42.00"]]
        });
        let config = GoogleSheetsConfig {
            api_key: Some("key".into()),
            api_base: stub(200, body).await,
        };
        let rows = google_sheets_read_rows(&config, params()).await.unwrap();
        assert_eq!(rows.values.len(), 2);
        assert_eq!(rows.values[1][1], "42.00");
    }
}
