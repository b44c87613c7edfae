//! Resolve a street address to coordinates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const GOOGLE_GEOCODE_BASE: &str = "https://maps.googleapis.com";
const OPENCAGE_BASE: &str = "https://api.opencagedata.com";

#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub google_api_key: Option<String>,
    pub opencage_api_key: Option<String>,
    pub google_base: String,
    pub opencage_base: String,
}

impl GeocodeConfig {
    pub fn from_env() -> Self {
        Self {
            google_api_key: std::env::var("GOOGLE_MAPS_API_KEY").ok(),
            opencage_api_key: std::env::var("OPENCAGE_API_KEY").ok(),
            google_base: GOOGLE_GEOCODE_BASE.to_string(),
            opencage_base: OPENCAGE_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeParams {
    pub address: String,
    /// "google" or "opencage". Defaults to "google".
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeocodedAddress {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub provider: String,
}

/// Geocode with the requested provider. No results is a fatal error.
pub async fn geocode_address(
    config: &GeocodeConfig,
    params: GeocodeParams,
) -> Result<GeocodedAddress> {
    if params.address.is_empty() {
        return Err(Error::InvalidInput("address is required".into()));
    }

    let provider = params.provider.as_deref().unwrap_or("google");
    debug!(%provider, "geocoding address");

    match provider {
        "google" => geocode_google(config, &params.address).await,
        "opencage" => geocode_opencage(config, &params.address).await,
        other => Err(Error::InvalidInput(format!(
            "unsupported geocoding provider: {}",
            other
        ))),
    }
}

async fn geocode_google(config: &GeocodeConfig, address: &str) -> Result<GeocodedAddress> {
    let api_key = config
        .google_api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("GOOGLE_MAPS_API_KEY is not configured".into()))?;

    let response = http_client()
        .get(format!("{}/maps/api/geocode/json", config.google_base))
        .query(&[("address", address), ("key", api_key)])
        .send()
        .await?;

    let body: Value = expect_success("Google Maps", response).await?.json().await?;

    let result = body["results"]
        .as_array()
        .and_then(|results| results.first())
        .ok_or_else(|| Error::InvalidInput(format!("no geocoding results for: {}", address)))?;

    let location = &result["geometry"]["location"];
    Ok(GeocodedAddress {
        latitude: location["lat"].as_f64().unwrap_or_default(),
        longitude: location["lng"].as_f64().unwrap_or_default(),
        formatted_address: result["formatted_address"]
            .as_str()
            .unwrap_or(address)
            .to_string(),
        provider: "google".to_string(),
    })
}

async fn geocode_opencage(config: &GeocodeConfig, address: &str) -> Result<GeocodedAddress> {
    let api_key = config
        .opencage_api_key
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("OPENCAGE_API_KEY is not configured".into()))?;

    let response = http_client()
        .get(format!("{}/geocode/v1/json", config.opencage_base))
        .query(&[("q", address), ("key", api_key), ("limit", "1")])
        .send()
        .await?;

    let body: Value = expect_success("OpenCage", response).await?.json().await?;

    let result = body["results"]
        .as_array()
        .and_then(|results| results.first())
        .ok_or_else(|| Error::InvalidInput(format!("no geocoding results for: {}", address)))?;

    Ok(GeocodedAddress {
        latitude: result["geometry"]["lat"].as_f64().unwrap_or_default(),
        longitude: result["geometry"]["lng"].as_f64().unwrap_or_default(),
        formatted_address: result["formatted"].as_str().unwrap_or(address).to_string(),
        provider: "opencage".to_string(),
    })
}
