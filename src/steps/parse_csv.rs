//! Parse CSV text into structured rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParseCsvParams {
    pub content: String,
    /// Single-character field delimiter. Defaults to ",".
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Treat the first record as a header row. Defaults to true.
    #[serde(default = "default_true")]
    pub has_header: bool,
    /// Drop records whose fields are all empty. Defaults to true.
    #[serde(default = "default_true")]
    pub skip_empty: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    /// With a header row, each record becomes a column-keyed object;
    /// without one, an array of strings.
    pub rows: Vec<Value>,
    pub row_count: usize,
}

/// Parse the content and return headers plus structured rows. Runs
/// locally, no I/O.
pub async fn parse_csv(params: ParseCsvParams) -> Result<ParsedCsv> {
    if params.content.trim().is_empty() {
        return Err(Error::InvalidInput("content is required".into()));
    }

    let delimiter = params.delimiter.as_bytes();
    if delimiter.len() != 1 {
        return Err(Error::InvalidInput(
            "delimiter must be a single character".into(),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter[0])
        .has_headers(params.has_header)
        .flexible(true)
        .from_reader(params.content.as_bytes());

    let headers: Vec<String> = if params.has_header {
        reader
            .headers()
            .map_err(|e| Error::InvalidInput(format!("invalid CSV header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::InvalidInput(format!("invalid CSV record: {}", e)))?;
        if params.skip_empty && record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        if params.has_header {
            let mut object = Map::new();
            for (index, field) in record.iter().enumerate() {
                let key = headers
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("column_{}", index));
                object.insert(key, Value::String(field.to_string()));
            }
            rows.push(Value::Object(object));
        } else {
            rows.push(Value::Array(
                record
                    .iter()
                    .map(|field| Value::String(field.to_string()))
                    .collect(),
            ));
        }
    }

    debug!(rows = rows.len(), "parsed CSV content");

    Ok(ParsedCsv {
        headers,
        row_count: rows.len(),
        rows,
    })
}
