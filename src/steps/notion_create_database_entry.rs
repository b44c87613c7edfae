//! Create an entry in a Notion database.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const NOTION_API_BASE: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: Option<String>,
    pub api_base: String,
}

impl NotionConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("NOTION_API_KEY").ok(),
            api_base: NOTION_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDatabaseEntryParams {
    pub database_id: String,
    /// Property names mapped to plain values; strings, numbers and bools
    /// are lifted into Notion's property format, anything else is passed
    /// through untouched.
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedEntry {
    pub id: Option<String>,
    pub url: Option<String>,
    pub created_time: Option<String>,
}

fn to_notion_property(value: &Value) -> Value {
    match value {
        Value::String(s) => json!({"rich_text": [{"text": {"content": s}}]}),
        Value::Number(n) => json!({"number": n}),
        Value::Bool(b) => json!({"checkbox": b}),
        other => other.clone(),
    }
}

/// Create a database entry, lifting plain JSON values into Notion's
/// property envelope.
pub async fn notion_create_database_entry(
    config: &NotionConfig,
    params: CreateDatabaseEntryParams,
) -> Result<CreatedEntry> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("NOTION_API_KEY is not configured".into()))?;

    if params.database_id.is_empty() || params.properties.is_empty() {
        return Err(Error::InvalidInput(
            "database_id and properties are required".into(),
        ));
    }

    let properties: Map<String, Value> = params
        .properties
        .iter()
        .map(|(name, value)| (name.clone(), to_notion_property(value)))
        .collect();

    debug!(database = %params.database_id, "creating Notion database entry");

    let response = http_client()
        .post(format!("{}/v1/pages", config.api_base))
        .bearer_auth(api_key)
        .header("Notion-Version", NOTION_VERSION)
        .json(&json!({
            "parent": {"database_id": params.database_id},
            "properties": properties,
        }))
        .send()
        .await?;

    let body: Value = expect_success("Notion", response).await?.json().await?;

    Ok(CreatedEntry {
        id: body["id"].as_str().map(str::to_string),
        url: body["url"].as_str().map(str::to_string),
        created_time: body["created_time"].as_str().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> CreateDatabaseEntryParams {
        let mut properties = Map::new();
        properties.insert("Name".into(), Value::String("Order 7".into()));
        properties.insert("Amount".into(), json!(99.5));
        properties.insert("Paid".into(), Value::Bool(true));
        CreateDatabaseEntryParams {
            database_id: "db-1".into(),
            properties,
        }
    }

    #[test]
    fn plain_values_are_lifted() {
        assert_eq!(
            to_notion_property(&Value::String("x".into()))["rich_text"][0]["text"]["content"],
            "x"
        );
        assert_eq!(to_notion_property(&json!(3))["number"], 3);
        assert_eq!(to_notion_property(&Value::Bool(true))["checkbox"], true);
        // Pre-formatted property envelopes pass through.
        let custom = json!({"select": {"name": "High"}});
        assert_eq!(to_notion_property(&custom), custom);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let config = NotionConfig {
            api_key: None,
            api_base: unreachable(),
        };
        let err = notion_create_database_entry(&config, params())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn empty_properties_are_invalid() {
        let config = NotionConfig {
            api_key: Some("secret_test".into()),
            api_base: unreachable(),
        };
        let p = CreateDatabaseEntryParams {
            database_id: "db-1".into(),
            properties: Map::new(),
        };
        let err = notion_create_database_entry(&config, p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn not_found_is_fatal() {
        let config = NotionConfig {
            api_key: Some("secret_test".into()),
            api_base: stub(404, serde_json::json!({"message": "no such database"})).await,
        };
        let err = notion_create_database_entry(&config, params())
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let config = NotionConfig {
            api_key: Some("secret_test".into()),
            api_base: stub(500, serde_json::json!({})).await,
        };
        let err = notion_create_database_entry(&config, params())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
