//! Resize and re-encode an image through the image processing service.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Base URL of the image processing service.
    pub service_url: Option<String>,
}

impl ImageConfig {
    pub fn from_env() -> Self {
        Self {
            service_url: std::env::var("IMAGE_SERVICE_URL").ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformImageParams {
    /// Source image URL, fetched before processing.
    pub image_url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Output format: "webp", "jpeg", "png", "avif". Defaults to "webp".
    #[serde(default)]
    pub format: Option<String>,
    /// Quality 1 to 100. Defaults to 80.
    #[serde(default)]
    pub quality: Option<u32>,
    /// Resize fit: "cover", "contain", "fill". Defaults to "cover".
    #[serde(default)]
    pub fit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformedImage {
    /// Base64-encoded output bytes.
    pub image_base64: String,
    pub format: String,
    pub original_size: usize,
    pub transformed_size: usize,
}

/// Fetch the source image, then post it to the processing service.
pub async fn transform_image(
    config: &ImageConfig,
    params: TransformImageParams,
) -> Result<TransformedImage> {
    let service_url = config
        .service_url
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("IMAGE_SERVICE_URL is not configured".into()))?;

    if params.image_url.is_empty() {
        return Err(Error::InvalidInput("image_url is required".into()));
    }

    let quality = params.quality.unwrap_or(80);
    if !(1..=100).contains(&quality) {
        return Err(Error::InvalidInput("quality must be between 1 and 100".into()));
    }

    let format = params.format.as_deref().unwrap_or("webp");
    let fit = params.fit.as_deref().unwrap_or("cover");

    debug!(source = %params.image_url, %format, "transforming image");

    let source = http_client().get(&params.image_url).send().await?;
    let original = expect_success("image source", source).await?.bytes().await?;

    let mut query: Vec<(&str, String)> = vec![
        ("format", format.to_string()),
        ("quality", quality.to_string()),
        ("fit", fit.to_string()),
    ];
    if let Some(width) = params.width {
        query.push(("width", width.to_string()));
    }
    if let Some(height) = params.height {
        query.push(("height", height.to_string()));
    }

    let response = http_client()
        .post(format!("{}/transform", service_url))
        .query(&query)
        .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
        .body(original.clone())
        .send()
        .await?;

    let transformed = expect_success("image service", response)
        .await?
        .bytes()
        .await?;

    Ok(TransformedImage {
        image_base64: base64::engine::general_purpose::STANDARD.encode(&transformed),
        format: format.to_string(),
        original_size: original.len(),
        transformed_size: transformed.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testutil::{stub, unreachable};

    fn params(image_url: String) -> TransformImageParams {
        TransformImageParams {
            image_url,
            width: Some(640),
            height: None,
            format: None,
            quality: None,
            fit: None,
        }
    }

    #[tokio::test]
    async fn missing_service_url_fails_before_any_request() {
        let config = ImageConfig { service_url: None };
        let err = transform_image(&config, params(unreachable()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_CONFIG");
    }

    #[tokio::test]
    async fn quality_out_of_range_is_invalid() {
        let config = ImageConfig {
            service_url: Some(unreachable()),
        };
        let mut p = params(unreachable());
        p.quality = Some(0);
        let err = transform_image(&config, p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn missing_source_image_is_fatal() {
        let source = stub(404, serde_json::json!({"error": "not found"})).await;
        let config = ImageConfig {
            service_url: Some(unreachable()),
        };
        let err = transform_image(&config, params(source)).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn service_error_is_retryable() {
        let source = stub(200, serde_json::json!("png-bytes")).await;
        let config = ImageConfig {
            service_url: Some(stub(503, serde_json::json!({})).await),
        };
        let err = transform_image(&config, params(source)).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn reports_sizes_and_defaults() {
        let source = stub(200, serde_json::json!("original-bytes")).await;
        let config = ImageConfig {
            service_url: Some(stub(200, serde_json::json!("webp")).await),
        };
        let image = transform_image(&config, params(source)).await.unwrap();
        assert_eq!(image.format, "webp");
        assert!(image.original_size > 0);
        assert!(image.transformed_size > 0);
    }
}
