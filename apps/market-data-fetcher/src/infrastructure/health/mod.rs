//! Health, Metrics and Snapshot API
//!
//! HTTP endpoint for health checks, Prometheus metrics, and the current
//! per-category snapshots.
//!
//! # Endpoints
//!
//! - `GET /health` - JSON health status with one entry per category
//! - `GET /healthz` - Kubernetes liveness probe (simple OK)
//! - `GET /readyz` - Kubernetes readiness probe (every category fetched once)
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /api/{category}` - Current snapshot as JSON
//! - `POST /api/{category}/refresh` - Request an immediate re-fetch

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::services::DashboardFeeds;
use crate::domain::feed::{Category, FeedStatus, FeedSummary};
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", or "unhealthy".
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Per-category feed state.
    pub feeds: Vec<FeedSummary>,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every category is serving live data.
    Healthy,
    /// Some categories are serving fallback data or have not fetched yet.
    Degraded,
    /// No category is serving live data.
    Unhealthy,
}

// =============================================================================
// API Server State
// =============================================================================

/// Shared state for the API server.
pub struct ApiServerState {
    version: String,
    started_at: Instant,
    feeds: DashboardFeeds,
}

impl ApiServerState {
    /// Create new server state.
    #[must_use]
    pub fn new(version: String, feeds: DashboardFeeds) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            feeds,
        }
    }
}

// =============================================================================
// API Server
// =============================================================================

/// Build the router. Exposed separately so it can be driven in-process.
#[must_use]
pub fn router(state: Arc<ApiServerState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/{category}", get(snapshot_handler))
        .route("/api/{category}/refresh", post(refresh_handler))
        .with_state(state)
}

/// Health and snapshot HTTP server.
pub struct ApiServer {
    listener: TcpListener,
    port: u16,
    state: Arc<ApiServerState>,
    cancel: CancellationToken,
}

impl ApiServer {
    /// Bind the listening socket on all interfaces.
    ///
    /// Port 0 picks an ephemeral port; see [`ApiServer::port`].
    ///
    /// # Errors
    ///
    /// Returns `ApiServerError::BindFailed` if the port cannot be bound.
    pub async fn bind(
        port: u16,
        state: Arc<ApiServerState>,
        cancel: CancellationToken,
    ) -> Result<Self, ApiServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiServerError::BindFailed(port, e.to_string()))?;
        let port = listener
            .local_addr()
            .map_err(|e| ApiServerError::BindFailed(port, e.to_string()))?
            .port();

        Ok(Self {
            listener,
            port,
            state,
            cancel,
        })
    }

    /// Port the server is bound to.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Serve requests until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ApiServerError::ServerFailed` if the HTTP server encounters
    /// a fatal error while running.
    pub async fn run(self) -> Result<(), ApiServerError> {
        let app = router(self.state);

        tracing::info!(port = self.port, "API server listening");

        axum::serve(self.listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ApiServerError::ServerFailed(e.to_string()))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<ApiServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<ApiServerState>>) -> impl IntoResponse {
    let is_ready = state
        .feeds
        .summaries()
        .iter()
        .all(|summary| summary.completed_fetches > 0);

    if is_ready {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

async fn snapshot_handler(
    State(state): State<Arc<ApiServerState>>,
    Path(category): Path<String>,
) -> Response {
    let category = match category.parse::<Category>() {
        Ok(category) => category,
        Err(e) => return not_found(&e.to_string()),
    };

    match category {
        Category::Crypto => Json(state.feeds.crypto.snapshot()).into_response(),
        Category::Forex => Json(state.feeds.forex.snapshot()).into_response(),
        Category::Equity => Json(state.feeds.equity.snapshot()).into_response(),
    }
}

async fn refresh_handler(
    State(state): State<Arc<ApiServerState>>,
    Path(category): Path<String>,
) -> Response {
    let category = match category.parse::<Category>() {
        Ok(category) => category,
        Err(e) => return not_found(&e.to_string()),
    };

    state.feeds.refresh(category);
    tracing::info!(category = %category, "Manual refresh requested via API");

    (
        StatusCode::ACCEPTED,
        Json(json!({ "category": category, "refresh": "requested" })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

fn build_health_response(state: &ApiServerState) -> HealthResponse {
    let feeds = state.feeds.summaries();
    let status = determine_health_status(&feeds);

    HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        feeds,
    }
}

/// A feed serves live data once a fetch has finished and the latest one
/// succeeded. A re-fetch in progress does not count against it.
fn is_live(summary: &FeedSummary) -> bool {
    summary.completed_fetches > 0
        && summary.error.is_none()
        && summary.status != FeedStatus::Degraded
}

fn determine_health_status(feeds: &[FeedSummary]) -> HealthStatus {
    let live = feeds.iter().filter(|f| is_live(f)).count();

    if live == 0 {
        HealthStatus::Unhealthy
    } else if live == feeds.len() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    }
}

// =============================================================================
// Errors
// =============================================================================

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
