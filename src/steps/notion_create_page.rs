//! Create a page in Notion.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const NOTION_API_BASE: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token.
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

/// A simplified content block; only the block types the step understands.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    /// "paragraph", "heading_1", "heading_2", or "heading_3".
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePageParams {
    /// Parent page ID.
    pub parent_page_id: String,
    pub title: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedPage {
    pub id: Option<String>,
    pub url: Option<String>,
    pub created_time: Option<String>,
}

/// Create a Notion page with optional simple content blocks.
pub async fn notion_create_page(
    config: &NotionConfig,
    params: CreatePageParams,
) -> Result<CreatedPage> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("NOTION_API_KEY is not configured".into()))?;

    if params.parent_page_id.is_empty() || params.title.is_empty() {
        return Err(Error::InvalidInput(
            "parent_page_id and title are required".into(),
        ));
    }

    let children: Vec<Value> = params
        .content
        .iter()
        .map(|block| {
            json!({
                "object": "block",
                "type": block.block_type,
                block.block_type.as_str(): {
                    "rich_text": [{"type": "text", "text": {"content": block.text}}]
                }
            })
        })
        .collect();

    debug!(parent = %params.parent_page_id, "creating Notion page");

    let response = http_client()
        .post(format!("{}/v1/pages", config.api_base))
        .bearer_auth(api_key)
        .header("Notion-Version", NOTION_VERSION)
        .json(&json!({
            "parent": {"page_id": params.parent_page_id},
            "properties": {
                "title": {"title": [{"text": {"content": params.title}}]}
            },
            "children": children,
        }))
        .send()
        .await?;

    let body: Value = expect_success("Notion", response).await?.json().await?;

    Ok(CreatedPage {
        id: body["id"].as_str().map(str::to_string),
        url: body["url"].as_str().map(str::to_string),
        created_time: body["created_time"].as_str().map(str::to_string),
    })
}
