//! API Server Integration Tests
//!
//! Exercises the health and snapshot endpoints in-process against a
//! dashboard whose sources are stubs or the bundled equity series.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use market_data_fetcher::domain::quotes::fallback_forex_quotes;
use market_data_fetcher::infrastructure::equity::EmbeddedEquitySource;
use market_data_fetcher::{
    ApiServer, ApiServerError, ApiServerState, Category, CryptoQuote, Dashboard, DashboardFeeds, DashboardSources,
    EquityQuote, FetchError, ForexQuote, MarketDataFetcher, MarketDataSource, RefreshIntervals,
    router,
};

// =============================================================================
// Stub Sources
// =============================================================================

struct DownCrypto;

#[async_trait]
impl MarketDataSource for DownCrypto {
    type Record = CryptoQuote;

    fn category(&self) -> Category {
        Category::Crypto
    }

    async fn fetch(&self) -> Result<Vec<CryptoQuote>, FetchError> {
        Err(FetchError::Status { status: 503 })
    }

    fn fallback(&self) -> Vec<CryptoQuote> {
        market_data_fetcher::domain::quotes::fallback_crypto_quotes()
    }
}

struct StaticForex {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MarketDataSource for StaticForex {
    type Record = ForexQuote;

    fn category(&self) -> Category {
        Category::Forex
    }

    async fn fetch(&self) -> Result<Vec<ForexQuote>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(fallback_forex_quotes().into_iter().take(3).collect())
    }

    fn fallback(&self) -> Vec<ForexQuote> {
        fallback_forex_quotes()
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    app: Router,
    forex_calls: Arc<AtomicUsize>,
    _dashboard: Dashboard,
}

/// Start a dashboard and wait until every category has fetched once.
async fn started() -> Harness {
    let forex_calls = Arc::new(AtomicUsize::new(0));
    let sources = DashboardSources {
        crypto: Arc::new(DownCrypto),
        forex: Arc::new(StaticForex {
            calls: Arc::clone(&forex_calls),
        }),
        equity: Arc::new(EmbeddedEquitySource::embedded(30)),
    };
    let intervals = RefreshIntervals {
        crypto: Duration::from_secs(3600),
        forex: Duration::from_secs(3600),
        equity: Duration::from_secs(3600),
    };
    let dashboard = Dashboard::start(sources, intervals, &CancellationToken::new());

    let feeds = dashboard.feeds().clone();
    tokio::time::timeout(Duration::from_secs(5), async {
        while feeds.summaries().iter().any(|s| s.completed_fetches == 0) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first fetches should complete");

    Harness {
        app: router(Arc::new(ApiServerState::new("test".to_string(), feeds))),
        forex_calls,
        _dashboard: dashboard,
    }
}

/// Feeds whose fetchers never run.
fn idle_feeds() -> DashboardFeeds {
    let cancel = CancellationToken::new();
    let crypto: Arc<dyn MarketDataSource<Record = CryptoQuote>> = Arc::new(DownCrypto);
    let forex: Arc<dyn MarketDataSource<Record = ForexQuote>> = Arc::new(StaticForex {
        calls: Arc::new(AtomicUsize::new(0)),
    });
    let equity: Arc<dyn MarketDataSource<Record = EquityQuote>> =
        Arc::new(EmbeddedEquitySource::embedded(30));

    DashboardFeeds {
        crypto: MarketDataFetcher::new(crypto, Duration::from_secs(60), cancel.clone()).1,
        forex: MarketDataFetcher::new(forex, Duration::from_secs(30), cancel.clone()).1,
        equity: MarketDataFetcher::new(equity, Duration::from_secs(300), cancel).1,
    }
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(app, "GET", uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// =============================================================================
// Health Endpoints
// =============================================================================

#[tokio::test]
async fn liveness_is_always_ok() {
    let harness = started().await;
    let (status, body) = send(&harness.app, "GET", "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn health_reports_degraded_category() {
    let harness = started().await;
    let (status, body) = get_json(&harness.app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["version"], "test");

    let feeds = body["feeds"].as_array().unwrap();
    assert_eq!(feeds.len(), 3);
    assert_eq!(feeds[0]["category"], "crypto");
    assert_eq!(feeds[0]["status"], "degraded");
    assert_eq!(feeds[0]["error"], "HTTP status 503");
    assert_eq!(feeds[1]["status"], "ready");
    assert_eq!(feeds[2]["status"], "ready");
}

#[tokio::test]
async fn readiness_after_first_fetches() {
    let harness = started().await;
    let (status, body) = send(&harness.app, "GET", "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"READY");
}

#[tokio::test]
async fn not_ready_or_healthy_before_any_fetch() {
    let app = router(Arc::new(ApiServerState::new("test".to_string(), idle_feeds())));

    let (status, body) = send(&app, "GET", "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, b"NOT READY");

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn metrics_unavailable_without_recorder() {
    let app = router(Arc::new(ApiServerState::new("test".to_string(), idle_feeds())));
    let (status, _) = send(&app, "GET", "/metrics").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Snapshot Endpoints
// =============================================================================

#[tokio::test]
async fn crypto_snapshot_serves_fallback_with_error() {
    let harness = started().await;
    let (status, body) = get_json(&harness.app, "/api/crypto").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "crypto");
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["error"], "HTTP status 503");
    assert!(body["last_updated"].is_null());
    assert_eq!(body["records"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn forex_snapshot_serves_live_records() {
    let harness = started().await;
    let (status, body) = get_json(&harness.app, "/api/forex").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert!(body["error"].is_null());
    assert!(body["last_updated_label"].is_string());

    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["pair"], "EUR/USD");
}

#[tokio::test]
async fn equity_snapshot_accepts_stocks_alias() {
    let harness = started().await;
    let (status, body) = get_json(&harness.app, "/api/stocks").await;

    assert_eq!(status, StatusCode::OK);
    let quote = &body["records"][0];
    assert_eq!(quote["summary"]["symbol"], "AAPL");
    assert_eq!(quote["summary"]["current_display"], "255.82");
    assert_eq!(quote["history"].as_array().unwrap().len(), 30);
    assert_eq!(quote["chart"][0]["time"], "15:30");
}

#[tokio::test]
async fn unknown_category_is_not_found() {
    let harness = started().await;

    let (status, body) = get_json(&harness.app, "/api/bonds").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown category: bonds");

    let (status, _) = send(&harness.app, "POST", "/api/bonds/refresh").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn refresh_triggers_another_fetch() {
    let harness = started().await;
    assert_eq!(harness.forex_calls.load(Ordering::SeqCst), 1);

    let (status, body) = send(&harness.app, "POST", "/api/forex/refresh").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["category"], "forex");

    tokio::time::timeout(Duration::from_secs(5), async {
        while harness.forex_calls.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("refresh should trigger a fetch");
}

// =============================================================================
// Listener
// =============================================================================

fn idle_state() -> Arc<ApiServerState> {
    Arc::new(ApiServerState::new("test".to_string(), idle_feeds()))
}

#[tokio::test]
async fn bind_rejects_port_in_use() {
    let first = ApiServer::bind(0, idle_state(), CancellationToken::new())
        .await
        .unwrap();

    let result = ApiServer::bind(first.port(), idle_state(), CancellationToken::new()).await;
    assert!(
        matches!(result, Err(ApiServerError::BindFailed(port, _)) if port == first.port()),
        "second bind on the same port should fail"
    );
}

#[tokio::test]
async fn bound_server_serves_until_cancelled() {
    let cancel = CancellationToken::new();
    let server = ApiServer::bind(0, idle_state(), cancel.clone()).await.unwrap();
    let port = server.port();
    let task = tokio::spawn(server.run());

    let body = reqwest::get(format!("http://127.0.0.1:{port}/healthz"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "OK");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("server should stop after cancellation")
        .unwrap()
        .unwrap();
}
