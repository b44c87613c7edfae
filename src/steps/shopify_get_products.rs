//! List products from a Shopify store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const SHOPIFY_API_VERSION: &str = "2024-01";
const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Admin API access token.
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
pub struct GetProductsParams {
    /// Shop domain, e.g. "mystore.myshopify.com".
    pub shop_domain: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopifyProduct {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub handle: Option<String>,
    pub variants: Value,
    pub images: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopifyProducts {
    pub products: Vec<ShopifyProduct>,
}

/// Fetch products via the Shopify Admin API.
pub async fn shopify_get_products(
    config: &ShopifyConfig,
    params: GetProductsParams,
) -> Result<ShopifyProducts> {
    let access_token = config
        .access_token
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("SHOPIFY_ACCESS_TOKEN is not configured".into()))?;

    if params.shop_domain.is_empty() {
        return Err(Error::InvalidInput("shop_domain is required".into()));
    }

    let base = config
        .api_base
        .clone()
        .unwrap_or_else(|| format!("https://{}", params.shop_domain));

    debug!(shop = %params.shop_domain, "fetching Shopify products");

    let response = http_client()
        .get(format!(
            "{}/admin/api/{}/products.json",
            base, SHOPIFY_API_VERSION
        ))
        .header("X-Shopify-Access-Token", access_token)
        .query(&[("limit", params.limit.unwrap_or(DEFAULT_LIMIT))])
        .send()
        .await?;

    let body: Value = expect_success("Shopify", response).await?.json().await?;

    let products = body["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .map(|product| ShopifyProduct {
                    id: product["id"].as_i64(),
                    title: product["title"].as_str().map(str::to_string),
                    handle: product["handle"].as_str().map(str::to_string),
                    variants: product["variants"].clone(),
                    images: product["images"].clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ShopifyProducts { products })
}
