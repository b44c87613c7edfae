//! Error types for stepdeck.
//!
//! Every failure falls into one of two classes: **unrecoverable** errors
//! (bad input, missing configuration, vendor rejections) that an external
//! workflow runtime must not retry, and **retryable** errors (network
//! faults, timeouts, 5xx, rate limits) that it may retry with its own
//! backoff policy. This crate never retries anything itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for stepdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// stepdeck error types.
#[derive(Error, Debug)]
pub enum Error {
    /// A required parameter is missing or malformed. Unrecoverable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required configuration (usually an environment-provided credential)
    /// is absent. Raised before any network call. Unrecoverable.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// The vendor rejected the request (auth failure, bad payload,
    /// unknown resource). Unrecoverable.
    #[error("{service} rejected the request ({status}): {message}")]
    Rejected {
        service: String,
        status: u16,
        message: String,
    },

    /// The vendor failed transiently (5xx, rate limit, timeout status).
    /// Retryable by the external runtime.
    #[error("{service} request failed ({status}): {message}")]
    Upstream {
        service: String,
        status: u16,
        message: String,
    },

    /// No step with the given name exists in the registry.
    #[error("Step not found: {0}")]
    StepNotFound(String),

    /// The registry manifest or a referenced step file is broken.
    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error code for machine parsing.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::MissingConfig(_) => "MISSING_CONFIG",
            Error::Rejected { .. } => "REJECTED",
            Error::Upstream { .. } => "UPSTREAM_ERROR",
            Error::StepNotFound(_) => "STEP_NOT_FOUND",
            Error::Registry(_) => "REGISTRY_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Whether an external runtime may retry the failed operation.
    ///
    /// Network faults and transient vendor failures are retryable;
    /// everything else signals that retrying would not help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Upstream { .. } => true,
            Error::Http(e) => {
                // Responses reqwest flagged as client errors are permanent;
                // connect failures and timeouts are transient.
                match e.status() {
                    Some(status) => status.is_server_error() || status.as_u16() == 429,
                    None => true,
                }
            }
            Error::Database(e) => matches!(
                e,
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: rusqlite::ffi::ErrorCode::DatabaseBusy
                            | rusqlite::ffi::ErrorCode::DatabaseLocked,
                        ..
                    },
                    _,
                )
            ),
            _ => false,
        }
    }

    /// Unrecoverable errors halt a workflow run without retry.
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }

    /// Get a sanitized error message safe for external consumers.
    ///
    /// Hides internal details like file paths and vendor response bodies
    /// that could leak information about the host serving the registry.
    pub fn external_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) => format!("Invalid input: {}", msg),
            Error::MissingConfig(msg) => format!("Missing configuration: {}", msg),
            Error::Rejected {
                service, status, ..
            } => format!("{} rejected the request ({})", service, status),
            Error::Upstream {
                service, status, ..
            } => format!("{} request failed ({})", service, status),
            Error::StepNotFound(name) => format!("Step not found: {}", name),
            Error::Config(msg) => format!("Configuration error: {}", msg),

            Error::Registry(_) => "A registry error occurred".to_string(),
            Error::Database(_) => "A database error occurred".to_string(),
            Error::Io(_) => "An I/O error occurred".to_string(),
            Error::Json(_) => "Invalid JSON format".to_string(),

            Error::Http(e) => {
                if let Some(status) = e.status() {
                    format!("HTTP request failed with status {}", status.as_u16())
                } else if e.is_timeout() {
                    "HTTP request timed out".to_string()
                } else if e.is_connect() {
                    "Failed to connect to remote server".to_string()
                } else {
                    "HTTP request failed".to_string()
                }
            }
        }
    }

    /// Convert to a machine-friendly JSON body with sanitized message.
    pub fn to_external_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.external_message(),
                "retryable": self.is_retryable(),
            }
        })
    }
}

/// Serializable error details for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&Error> for ErrorDetail {
    fn from(e: &Error) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.external_message(),
            retryable: e.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_is_fatal() {
        let e = Error::MissingConfig("SLACK_BOT_TOKEN is not configured".into());
        assert!(e.is_fatal());
        assert!(!e.is_retryable());
        assert_eq!(e.code(), "MISSING_CONFIG");
    }

    #[test]
    fn rejected_is_fatal_and_upstream_is_retryable() {
        let rejected = Error::Rejected {
            service: "GitHub".into(),
            status: 401,
            message: "Bad credentials".into(),
        };
        assert!(rejected.is_fatal());

        let upstream = Error::Upstream {
            service: "GitHub".into(),
            status: 503,
            message: "unavailable".into(),
        };
        assert!(upstream.is_retryable());
    }

    #[test]
    fn external_message_hides_vendor_body() {
        let e = Error::Rejected {
            service: "Slack".into(),
            status: 403,
            message: "token=xoxb-secret".into(),
        };
        assert!(!e.external_message().contains("xoxb-secret"));
    }

    #[test]
    fn external_json_carries_code_and_retryable_flag() {
        let e = Error::Upstream {
            service: "Vercel".into(),
            status: 500,
            message: "internal".into(),
        };
        let body = e.to_external_json();
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(body["error"]["retryable"], true);
    }
}
