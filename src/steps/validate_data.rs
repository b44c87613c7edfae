//! Validate a JSON payload against a JSON Schema.

use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateDataParams {
    pub data: Value,
    pub schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatedData {
    pub valid: bool,
    pub data: Value,
}

/// Validate the payload. Schema violations and malformed schemas are
/// both unrecoverable. Runs locally, no I/O.
pub async fn validate_data(params: ValidateDataParams) -> Result<ValidatedData> {
    let validator = validator_for(&params.schema)
        .map_err(|e| Error::InvalidInput(format!("invalid schema: {}", e)))?;

    let violations: Vec<String> = validator
        .iter_errors(&params.data)
        .map(|error| format!("{}: {}", error.instance_path, error))
        .collect();

    if !violations.is_empty() {
        return Err(Error::InvalidInput(format!(
            "validation failed: {}",
            violations.join("; ")
        )));
    }

    debug!("payload passed schema validation");

    Ok(ValidatedData {
        valid: true,
        data: params.data,
    })
}
