//! Create an order in a Shopify store.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const SHOPIFY_API_VERSION: &str = "2024-01";

#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub access_token: Option<String>,
    /// Overrides the `https://{shop_domain}` base, for tests.
    pub api_base: Option<String>,
}

impl ShopifyConfig {
    pub fn from_env() -> Self {
        Self {
            access_token: std::env::var("SHOPIFY_ACCESS_TOKEN").ok(),
            api_base: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    pub variant_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderParams {
    pub shop_domain: String,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrder {
    pub id: Option<i64>,
    pub order_number: Option<i64>,
    pub total_price: Option<String>,
    pub created_at: Option<String>,
}

/// Create a Shopify order from line items.
pub async fn shopify_create_order(
    config: &ShopifyConfig,
    params: CreateOrderParams,
) -> Result<CreatedOrder> {
    let access_token = config
        .access_token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("SHOPIFY_ACCESS_TOKEN is not configured".into()))?;

    if params.shop_domain.is_empty() || params.line_items.is_empty() {
        return Err(Error::InvalidInput(
            "shop_domain and line_items are required".into(),
        ));
    }

    let base = config
        .api_base
        .clone()
        .unwrap_or_else(|| format!("https://{}", params.shop_domain));

    let line_items: Vec<Value> = params
        .line_items
        .iter()
        .map(|item| json!({"variant_id": item.variant_id, "quantity": item.quantity}))
        .collect();

    let mut order = json!({"line_items": line_items});
    if let Some(customer) = &params.customer {
        order["customer"] = serde_json::to_value(customer)?;
    }

    debug!(shop = %params.shop_domain, items = params.line_items.len(), "creating Shopify order");

    let response = http_client()
        .post(format!(
            "{}/admin/api/{}/orders.json",
            base, SHOPIFY_API_VERSION
        ))
        .header("X-Shopify-Access-Token", access_token)
        .json(&json!({"order": order}))
        .send()
        .await?;

    let body: Value = expect_success("Shopify", response).await?.json().await?;
    let order = &body["order"];

    Ok(CreatedOrder {
        id: order["id"].as_i64(),
        order_number: order["order_number"].as_i64(),
        total_price: order["total_price"].as_str().map(str::to_string),
        created_at: order["created_at"].as_str().map(str::to_string),
    })
}
