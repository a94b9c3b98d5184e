//! Market Data Fetcher Binary
//!
//! Starts the per-category fetchers and the health/snapshot API server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-data-fetcher
//! ```
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ITICK_TOKEN`: iTick API token (forex serves fallback data without it)
//! - `COINGECKO_BASE_URL`: CoinGecko API base (default: <https://api.coingecko.com/api/v3>)
//! - `CRYPTO_VS_CURRENCY`: Quote currency for crypto prices (default: usd)
//! - `CRYPTO_PER_PAGE`: Number of coins (default: 10)
//! - `CRYPTO_REFRESH_INTERVAL_SECS`: Crypto refresh interval (default: 60)
//! - `ITICK_BASE_URL`: iTick API base (default: <https://api.itick.org>)
//! - `FOREX_REGION`: iTick market region (default: GB)
//! - `FOREX_PAIRS`: Comma-separated pair codes (default: ten majors)
//! - `FOREX_REFRESH_INTERVAL_SECS`: Forex refresh interval (default: 30)
//! - `EQUITY_REFRESH_INTERVAL_SECS`: Equity refresh interval (default: 300)
//! - `EQUITY_HISTORY_LEN`: Bars kept on the equity quote (default: 30)
//! - `HTTP_TIMEOUT_SECS`: Upstream request timeout (default: none)
//! - `MARKET_DATA_HTTP_PORT`: Health/snapshot API port (default: 8083)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: market-data-fetcher)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use market_data_fetcher::infrastructure::coingecko::CoinGeckoSource;
use market_data_fetcher::infrastructure::equity::EmbeddedEquitySource;
use market_data_fetcher::infrastructure::http::JsonHttpClient;
use market_data_fetcher::infrastructure::itick::ITickSource;
use market_data_fetcher::{
    ApiServer, ApiServerState, Dashboard, DashboardSources, FetcherConfig, init_metrics,
    init_telemetry,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = init_telemetry();

    tracing::info!("Starting Market Data Fetcher");

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed");
    }

    let config = FetcherConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let http = JsonHttpClient::new(config.http.timeout).context("failed to build HTTP client")?;
    let sources = DashboardSources {
        crypto: Arc::new(CoinGeckoSource::new(http.clone(), config.crypto.clone())),
        forex: Arc::new(ITickSource::new(http, config.forex.clone())),
        equity: Arc::new(EmbeddedEquitySource::embedded(config.equity.history_len)),
    };

    let dashboard = Dashboard::start(sources, config.intervals(), &shutdown_token);

    // Bind before spawning so a port clash stops startup
    let server_state = Arc::new(ApiServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        dashboard.feeds().clone(),
    ));
    let server = ApiServer::bind(
        config.server.http_port,
        server_state,
        shutdown_token.clone(),
    )
    .await
    .context("failed to start API server")?;
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "API server error");
        }
    });

    tracing::info!("Market data fetcher ready");

    await_shutdown(shutdown_token).await;

    let drain = async {
        dashboard.shutdown().await;
        if let Err(e) = server_task.await {
            tracing::error!(error = %e, "API server task failed");
        }
    };
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await.is_err() {
        tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Shutdown timed out with fetches in flight"
        );
    }

    tracing::info!("Market data fetcher stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &FetcherConfig) {
    tracing::info!(
        crypto_per_page = config.crypto.per_page,
        forex_pairs = config.forex.pairs.len(),
        forex_token = config.forex.token.is_some(),
        equity_history_len = config.equity.history_len,
        http_port = config.server.http_port,
        "Configuration loaded"
    );
    tracing::debug!(
        coingecko = %config.crypto.base_url,
        itick = %config.forex.base_url,
        region = %config.forex.region,
        "Upstream endpoints"
    );
    if config.forex.token.is_none() {
        tracing::warn!("ITICK_TOKEN not set, forex will serve fallback data");
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
