#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Market Data Fetcher - Periodic Quote Snapshots
//!
//! Polls public market-data providers on fixed intervals, normalizes the
//! responses into display records, and keeps one snapshot per category.
//! When a fetch fails the category degrades to a fixed fallback dataset and
//! records the error; the next successful fetch restores live data.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure types and formatting
//!   - `format`: Price, percent and compact-volume formatting
//!   - `quotes`: Crypto, forex and equity display records with fallbacks
//!   - `feed`: Category and per-category feed state machine
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: `MarketDataSource` trait and `FetchError`
//!   - `services`: Scheduled fetchers and the `Dashboard` that owns them
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `coingecko`: Top coins by market cap
//!   - `itick`: Major forex pairs
//!   - `equity`: Bundled AAPL minute bars
//!   - `http`: Shared JSON client
//!   - `config`: Environment configuration
//!   - `health`: Health, metrics and snapshot HTTP endpoint
//!
//! # Data Flow
//!
//! ```text
//! CoinGecko ──► CoinGeckoSource ──► Fetcher (60s)  ──┐
//! iTick     ──► ITickSource     ──► Fetcher (30s)  ──┼──► watch ──► API server
//! bundled   ──► EquitySource    ──► Fetcher (300s) ──┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Quote records and feed state with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::feed::{Category, FeedEvent, FeedState, FeedStatus, FeedSummary};
pub use domain::quotes::{CryptoQuote, EquityQuote, ForexQuote};

// Application
pub use application::ports::{FetchError, MarketDataSource};
pub use application::services::{
    Dashboard, DashboardFeeds, DashboardSources, FeedHandle, MarketDataFetcher, RefreshIntervals,
};

// Infrastructure config
pub use infrastructure::config::{ConfigError, FetcherConfig};

// API server
pub use infrastructure::health::{ApiServer, ApiServerError, ApiServerState, router};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
