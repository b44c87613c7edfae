//! Render HTML to a PDF through the configured rendering service.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Base URL of the HTML-to-PDF rendering service.
    pub service_url: Option<String>,
}

impl PdfConfig {
    pub fn from_env() -> Self {
        Self {
            service_url: std::env::var("PDF_SERVICE_URL").ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePdfParams {
    pub html: String,
    /// Page format: "A4", "Letter", "Legal". Defaults to "A4".
    #[serde(default)]
    pub format: Option<String>,
    /// CSS margin applied to all four sides. Defaults to "1cm".
    #[serde(default)]
    pub margin: Option<String>,
    #[serde(default)]
    pub landscape: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedPdf {
    /// Base64-encoded PDF bytes.
    pub pdf_base64: String,
    pub size: usize,
    pub format: String,
}

/// Send HTML to the rendering service and return the PDF as base64.
pub async fn create_pdf(config: &PdfConfig, params: CreatePdfParams) -> Result<CreatedPdf> {
    let service_url = config
        .service_url
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("PDF_SERVICE_URL is not configured".into()))?;

    if params.html.is_empty() {
        return Err(Error::InvalidInput("html is required".into()));
    }

    let format = params.format.as_deref().unwrap_or("A4");
    let margin = params.margin.as_deref().unwrap_or("1cm");

    debug!(%format, landscape = params.landscape, "rendering PDF");

    let response = http_client()
        .post(format!("{}/render", service_url))
        .json(&json!({
            "html": params.html,
            "format": format,
            "margin": {"top": margin, "right": margin, "bottom": margin, "left": margin},
            "landscape": params.landscape,
        }))
        .send()
        .await?;

    let bytes = expect_success("PDF service", response).await?.bytes().await?;

    Ok(CreatedPdf {
        pdf_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
        size: bytes.len(),
        format: format.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params() -> CreatePdfParams {
        CreatePdfParams {
            html: "<h1>Invoice</h1>".into(),
            format: None,
            margin: None,
            landscape: false,
        }
    }

    #[tokio::test]
    async fn missing_service_url_fails_before_any_request() {
        let config = PdfConfig { service_url: None };
        let err = create_pdf(&config, params()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn empty_html_is_invalid() {
        let config = PdfConfig {
            service_url: Some(unreachable()),
        };
        let mut p = params();
        p.html = String::new();
        let err = create_pdf(&config, p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn bad_request_is_fatal() {
        let config = PdfConfig {
            service_url: Some(stub(400, serde_json::json!({"error": "bad html"})).await),
        };
        let err = create_pdf(&config, params()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let config = PdfConfig {
            service_url: Some(stub(503, serde_json::json!({})).await),
        };
        let err = create_pdf(&config, params()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn encodes_response_bytes() {
        let config = PdfConfig {
            service_url: Some(stub(200, serde_json::json!("%PDF-1.7")).await),
        };
        let pdf = create_pdf(&config, params()).await.unwrap();
        assert!(pdf.size > 0);
        assert_eq!(pdf.format, "A4");
        assert!(base64::engine::general_purpose::STANDARD
            .decode(&pdf.pdf_base64)
            .is_ok());
    }
}
