//! Generate a QR code image through a QR rendering service.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const DEFAULT_QR_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code";
const MIN_SIZE: u32 = 100;
const MAX_SIZE: u32 = 2000;

#[derive(Debug, Clone)]
pub struct QrConfig {
    pub service_url: String,
}

impl QrConfig {
    pub fn from_env() -> Self {
        Self {
            service_url: std::env::var("QR_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_QR_SERVICE.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateQrParams {
    /// Text or URL to encode.
    pub data: String,
    /// Square edge length in pixels, 100 to 2000. Defaults to 300.
    #[serde(default)]
    pub size: Option<u32>,
    /// Error correction level: "L", "M", "Q", or "H". Defaults to "M".
    #[serde(default)]
    pub error_correction: Option<String>,
    /// Quiet-zone width in modules. Defaults to 4.
    #[serde(default)]
    pub margin: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrCode {
    /// Base64-encoded PNG bytes.
    pub image_base64: String,
    pub size: u32,
    pub error_correction: String,
}

/// Render the data as a QR code PNG.
pub async fn generate_qr_code(config: &QrConfig, params: GenerateQrParams) -> Result<QrCode> {
    if params.data.is_empty() {
        return Err(Error::InvalidInput("data is required".into()));
    }

    let size = params.size.unwrap_or(300);
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(Error::InvalidInput(format!(
            "size must be between {} and {} pixels",
            MIN_SIZE, MAX_SIZE
        )));
    }

    let ecc = params.error_correction.as_deref().unwrap_or("M");
    if !matches!(ecc, "L" | "M" | "Q" | "H") {
        return Err(Error::InvalidInput(
            "error_correction must be one of L, M, Q, H".into(),
        ));
    }

    let margin = params.margin.unwrap_or(4);
    let dimensions = format!("{}x{}", size, size);

    debug!(size, %ecc, "generating QR code");

    let response = http_client()
        .get(&config.service_url)
        .query(&[
            ("data", params.data.as_str()),
            ("size", &dimensions),
            ("ecc", ecc),
            ("margin", &margin.to_string()),
            ("format", "png"),
        ])
        .send()
        .await?;

    let bytes = expect_success("QR service", response).await?.bytes().await?;

    Ok(QrCode {
        image_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
        size,
        error_correction: ecc.to_string(),
    })
}
