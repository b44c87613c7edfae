//! Fetch a web page and extract its title and text content.

use chrono::Utc;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{expect_success, http_client};
use crate::error::{Error, Result};

const MAX_TEXT_LEN: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeParams {
    pub url: String,
    /// Optional regex applied to the page HTML; capture group 1 (or the
    /// whole match) becomes `extracted`.
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: Option<String>,
    /// Tag-stripped, whitespace-collapsed body text, truncated.
    pub text: String,
    pub extracted: Option<String>,
    pub scraped_at: String,
}

/// Fetch the page and extract title, text, and an optional pattern match.
pub async fn scrape_website(params: ScrapeParams) -> Result<ScrapedPage> {
    if params.url.is_empty() {
        return Err(Error::InvalidInput("url is required".into()));
    }

    // Compile before fetching so a bad pattern never costs a request.
    let pattern = params
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| Error::InvalidInput(format!("invalid pattern: {}", e)))?;

    debug!(url = %params.url, "scraping page");

    let response = http_client().get(&params.url).send().await?;
    let html = expect_success("scrape target", response).await?.text().await?;

    let title = extract_title(&html);
    let text = extract_text(&html);
    let extracted = pattern.and_then(|re| {
        re.captures(&html).map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
    });

    Ok(ScrapedPage {
        url: params.url,
        title,
        text,
        extracted,
        scraped_at: Utc::now().to_rfc3339(),
    })
}

fn extract_title(html: &str) -> Option<String> {
    let re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn extract_text(html: &str) -> String {
    // Drop script and style bodies, then strip the remaining tags.
    let without_blocks = Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>")
        .map(|re| re.replace_all(html, " ").into_owned())
        .unwrap_or_else(|_| html.to_string());
    let without_tags = Regex::new(r"(?s)<[^>]+>")
        .map(|re| re.replace_all(&without_blocks, " ").into_owned())
        .unwrap_or(without_blocks);

    let mut text = without_tags.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.len() > MAX_TEXT_LEN {
        let mut cut = MAX_TEXT_LEN;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
