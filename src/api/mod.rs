//! HTTP API server for stepdeck.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::error::Error;
use crate::registry::Registry;

/// Create a sanitized error response for external consumers.
///
/// This logs the full error internally but returns only safe information
/// to external clients to prevent information leakage.
fn external_error_response(e: Error) -> (StatusCode, Json<Value>) {
    // Log full error for debugging
    error!("API error: {:?}", e);

    // Return sanitized message to client
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": e.external_message()})),
    )
}

/// Create CORS layer based on environment configuration.
///
/// This is exported for use by the main server.
///
/// - STEPDECK_CORS_ORIGINS: Comma-separated list of allowed origins (default: http://localhost:3000)
/// - STEPDECK_CORS_ALLOW_ALL: Set to "true" to allow all origins (NOT recommended for production)
pub fn create_cors_layer() -> CorsLayer {
    let allow_all = std::env::var("STEPDECK_CORS_ALLOW_ALL")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    if allow_all {
        warn!("CORS configured to allow all origins - this is NOT secure for production!");
        return CorsLayer::very_permissive();
    }

    let origins_str = std::env::var("STEPDECK_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(hv) => Some(hv),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        warn!("No valid CORS origins configured, using localhost:3000");
        CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    }
}

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Get the maximum concurrent requests limit from environment.
///
/// - STEPDECK_MAX_CONCURRENT_REQUESTS: Maximum concurrent requests (default: 100)
pub fn get_max_concurrent_requests() -> usize {
    std::env::var("STEPDECK_MAX_CONCURRENT_REQUESTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
}

/// Create a concurrency limit layer to prevent resource exhaustion.
pub fn create_concurrency_limit() -> tower::limit::ConcurrencyLimitLayer {
    let max = get_max_concurrent_requests();
    tower::limit::ConcurrencyLimitLayer::new(max)
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
}

/// Create the API router (without state applied - call with_state on the result).
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/registry", get(get_manifest))
        .route("/api/registry/{name}", get(get_installer_payload))
        .route("/api/steps", get(list_steps))
        .route("/api/steps/{name}", get(get_step_detail))
        .route("/api/integrations", get(list_integrations))
}

/// Create the complete API router with state.
pub fn create_router(state: AppState) -> Router {
    create_api_routes()
        .layer(create_concurrency_limit())
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

fn step_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Step not found"})))
}

// ============================================================================
// Health Check
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "steps": state.registry.manifest().items.len(),
    }))
}

// ============================================================================
// Catalog Endpoints
// ============================================================================

/// The raw manifest, exactly as stored on disk.
async fn get_manifest(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.registry.raw_manifest().clone())
}

/// Installer payload for one step: descriptor plus inlined file contents.
async fn get_installer_payload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.registry.installer_payload(&name) {
        Ok(Some(payload)) => Json(payload).into_response(),
        Ok(None) => step_not_found().into_response(),
        Err(e) => external_error_response(e).into_response(),
    }
}

// ============================================================================
// Step Endpoints
// ============================================================================

async fn list_steps(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"steps": state.registry.steps()}))
}

async fn get_step_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.registry.detail(&name) {
        Some(detail) => Json(detail).into_response(),
        None => step_not_found().into_response(),
    }
}

async fn list_integrations(State(state): State<AppState>) -> impl IntoResponse {
    let integrations: Vec<Value> = state
        .registry
        .integrations()
        .into_iter()
        .map(|(name, count)| json!({"name": name, "steps": count}))
        .collect();
    Json(json!({"integrations": integrations}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    async fn serve_catalog() -> (String, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("steps")).unwrap();
        fs::write(
            dir.path().join("steps/send_slack_message.rs"),
            r#"pub async fn send_slack_message() { let _ = std::env::var("SLACK_BOT_TOKEN"); }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("registry.json"),
            serde_json::to_string_pretty(&json!({
                "name": "stepdeck",
                "items": [{
                    "name": "send-slack-message",
                    "type": "registry:step",
                    "description": "Post a message to a Slack channel",
                    "dependencies": ["reqwest"],
                    "files": [{"path": "steps/send_slack_message.rs", "type": "registry:step"}]
                }]
            }))
            .unwrap(),
        )
        .unwrap();

        let registry = Registry::load(dir.path()).unwrap();
        let state = AppState {
            registry: Arc::new(registry),
        };
        let app = create_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (base, dir)
    }

    #[tokio::test]
    async fn health_reports_step_count() {
        let (base, _dir) = serve_catalog().await;
        let body: Value = reqwest::get(format!("{}/api/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["steps"], 1);
    }

    #[tokio::test]
    async fn manifest_is_served_verbatim() {
        let (base, _dir) = serve_catalog().await;
        let body: Value = reqwest::get(format!("{}/api/registry", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["items"][0]["name"], "send-slack-message");
        // Derived fields never leak into the raw manifest.
        assert!(body["items"][0].get("category").is_none());
    }

    #[tokio::test]
    async fn installer_payload_includes_file_content() {
        let (base, _dir) = serve_catalog().await;
        let body: Value = reqwest::get(format!("{}/api/registry/send-slack-message", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["name"], "send-slack-message");
        assert!(body["files"][0]["content"]
            .as_str()
            .unwrap()
            .contains("pub async fn send_slack_message"));
    }

    #[tokio::test]
    async fn unknown_step_is_json_404() {
        let (base, _dir) = serve_catalog().await;
        for path in ["/api/registry/no-such-step", "/api/steps/no-such-step"] {
            let response = reqwest::get(format!("{}{}", base, path)).await.unwrap();
            assert_eq!(response.status(), 404);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["error"], "Step not found");
        }
    }

    #[tokio::test]
    async fn step_list_carries_classification() {
        let (base, _dir) = serve_catalog().await;
        let body: Value = reqwest::get(format!("{}/api/steps", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let step = &body["steps"][0];
        assert_eq!(step["category"], "notifications");
        assert_eq!(step["integrations"][0], "Slack");
    }

    #[tokio::test]
    async fn step_detail_scans_env_vars() {
        let (base, _dir) = serve_catalog().await;
        let body: Value = reqwest::get(format!("{}/api/steps/send-slack-message", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["title"], "Send Slack Message");
        assert_eq!(body["env_vars"][0]["name"], "SLACK_BOT_TOKEN");
        assert!(body["usage"]
            .as_str()
            .unwrap()
            .contains("send_slack_message"));
    }

    #[tokio::test]
    async fn integrations_endpoint_counts_steps() {
        let (base, _dir) = serve_catalog().await;
        let body: Value = reqwest::get(format!("{}/api/integrations", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["integrations"][0]["name"], "Slack");
        assert_eq!(body["integrations"][0]["steps"], 1);
    }
}
