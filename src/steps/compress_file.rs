//! Compress text content with gzip, zlib, or raw deflate.

use std::io::Write as _;

use base64::Engine as _;
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CompressFileParams {
    pub content: String,
    /// "gzip", "zlib", or "deflate". Defaults to "gzip".
    #[serde(default)]
    pub format: Option<String>,
    /// Compression level 0 to 9. Defaults to 6.
    #[serde(default)]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressedFile {
    /// Base64-encoded compressed bytes.
    pub compressed_base64: String,
    pub format: String,
    pub original_size: usize,
    pub compressed_size: usize,
    /// Compression ratio as a percentage string, e.g. "62.50%".
    pub ratio: String,
}

/// Compress the content and report size savings. Runs locally, no I/O.
pub async fn compress_file(params: CompressFileParams) -> Result<CompressedFile> {
    if params.content.is_empty() {
        return Err(Error::InvalidInput("content is required".into()));
    }

    let level = params.level.unwrap_or(6);
    if level > 9 {
        return Err(Error::InvalidInput("level must be between 0 and 9".into()));
    }

    let format = params.format.as_deref().unwrap_or("gzip");
    let input = params.content.as_bytes();
    let compression = Compression::new(level);

    let compressed = match format {
        "gzip" => {
            let mut encoder = GzEncoder::new(Vec::new(), compression);
            encoder.write_all(input)?;
            encoder.finish()?
        }
        "zlib" => {
            let mut encoder = ZlibEncoder::new(Vec::new(), compression);
            encoder.write_all(input)?;
            encoder.finish()?
        }
        "deflate" => {
            let mut encoder = DeflateEncoder::new(Vec::new(), compression);
            encoder.write_all(input)?;
            encoder.finish()?
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "unsupported compression format: {}",
                other
            )))
        }
    };

    let original_size = input.len();
    let compressed_size = compressed.len();
    let ratio = format!(
        "{:.2}%",
        (compressed_size as f64 / original_size as f64) * 100.0
    );

    debug!(%format, original_size, compressed_size, "compressed content");

    Ok(CompressedFile {
        compressed_base64: base64::engine::general_purpose::STANDARD.encode(&compressed),
        format: format.to_string(),
        original_size,
        compressed_size,
        ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    fn params(format: &str) -> CompressFileParams {
        CompressFileParams {
            content: "hello hello hello hello hello hello".repeat(20),
            format: Some(format.into()),
            level: None,
        }
    }

    #[tokio::test]
    async fn empty_content_is_invalid() {
        let err = compress_file(CompressFileParams {
            content: String::new(),
            format: None,
            level: None,
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn unknown_format_is_invalid() {
        let err = compress_file(params("brotli")).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn level_above_nine_is_invalid() {
        let mut p = params("gzip");
        p.level = Some(11);
        let err = compress_file(p).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn gzip_round_trips() {
        let p = params("gzip");
        let original = p.content.clone();
        let compressed = compress_file(p).await.unwrap();
        assert!(compressed.compressed_size < compressed.original_size);

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&compressed.compressed_base64)
            .unwrap();
        let mut decoder = flate2::read::GzDecoder::new(&bytes[..]);
        let mut restored = String::new();
        decoder.read_to_string(&mut restored).unwrap();
        assert_eq!(restored, original);
    }

    #[tokio::test]
    async fn reports_ratio_with_two_decimals() {
        let compressed = compress_file(params("zlib")).await.unwrap();
        assert!(compressed.ratio.ends_with('%'));
        let number = compressed.ratio.trim_end_matches('%');
        assert!(number.parse::<f64>().is_ok());
        assert_eq!(number.split('.').nth(1).map(str::len), Some(2));
    }

    #[tokio::test]
    async fn deflate_is_supported() {
        let compressed = compress_file(params("deflate")).await.unwrap();
        assert_eq!(compressed.format, "deflate");
        assert!(compressed.compressed_size > 0);
    }
}
