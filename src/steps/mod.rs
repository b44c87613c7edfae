//! Step function library.
//!
//! Each module is one copy-paste step: a stateless async function wrapping
//! a single outbound call to a third-party service. Steps share nothing
//! between invocations. They validate parameters and configuration up
//! front (fatal when absent, before any network I/O), perform the call,
//! and classify the outcome: 4xx rejections are unrecoverable, 5xx and
//! network faults are left retryable for the external workflow runtime.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use crate::error::{Error, Result};

pub mod airtable_create_record;
pub mod airtable_query_records;
pub mod compress_file;
pub mod create_pdf;
pub mod fetch_api_data;
pub mod generate_ai_content;
pub mod generate_qr_code;
pub mod geocode_address;
pub mod github_create_issue;
pub mod github_create_pr;
pub mod google_drive_upload_file;
pub mod google_sheets_append_row;
pub mod google_sheets_read_rows;
pub mod notion_create_database_entry;
pub mod notion_create_page;
pub mod parse_csv;
pub mod query_database;
pub mod scrape_website;
pub mod send_discord_webhook;
pub mod send_email;
pub mod send_slack_message;
pub mod send_sms;
pub mod send_webhook;
pub mod shopify_create_order;
pub mod shopify_get_products;
pub mod telegram_send_message;
pub mod transform_image;
pub mod upload_to_storage;
pub mod validate_data;
pub mod vercel_cancel_deployment;
pub mod vercel_create_deployment;
pub mod vercel_edge_config_get;
pub mod vercel_edge_config_set;
pub mod vercel_get_deployment;
pub mod vercel_get_domains;
pub mod vercel_get_project;
pub mod vercel_list_deployments;
pub mod vercel_purge_cache;
pub mod vercel_set_env_var;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Cap on vendor error bodies carried inside error messages.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Shared HTTP client with request and connect timeouts.
///
/// A timed-out request surfaces as a retryable error; the external
/// runtime owns the actual retry schedule.
pub(crate) fn http_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout defaults: {}", e);
                Client::new()
            })
    })
}

/// Classify a vendor response by status code.
///
/// 2xx passes through; 408, 429 and 5xx become retryable upstream errors;
/// any other 4xx is an unrecoverable rejection.
pub(crate) async fn expect_success(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY_LEN {
        // Back off to a char boundary; vendor bodies are often non-ASCII.
        let mut cut = MAX_ERROR_BODY_LEN;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }

    if code == 408 || code == 429 || status.is_server_error() {
        Err(Error::Upstream {
            service: service.to_string(),
            status: code,
            message,
        })
    } else {
        Err(Error::Rejected {
            service: service.to_string(),
            status: code,
            message,
        })
    }
}
