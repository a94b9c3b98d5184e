//! Prometheus Metrics Module
//!
//! # Metrics
//!
//! - `market_data_fetches_total{category,outcome}`: fetch cycles by outcome
//! - `market_data_fetch_duration_seconds{category}`: upstream latency
//! - `market_data_snapshot_records{category}`: records in the active snapshot
//! - `market_data_fallback_active{category}`: 1 while serving fallback data
//! - `market_data_manual_refreshes_total{category}`: retry requests
//!
//! Metrics are exposed at `/metrics` on the API server port. Recording is a
//! no-op until [`init_metrics`] installs the recorder.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::domain::feed::Category;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls return the same handle.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "market_data_fetches_total",
        "Fetch cycles by category and outcome"
    );
    describe_histogram!(
        "market_data_fetch_duration_seconds",
        "Upstream fetch latency"
    );
    describe_gauge!(
        "market_data_snapshot_records",
        "Records in the active snapshot"
    );
    describe_gauge!(
        "market_data_fallback_active",
        "1 while the category serves its fallback dataset"
    );
    describe_counter!(
        "market_data_manual_refreshes_total",
        "Manual refresh requests"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome label for a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Snapshot replaced with live data.
    Success,
    /// Fetch failed; the label is the error kind.
    Failure(&'static str),
}

impl FetchOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure(kind) => kind,
        }
    }
}

/// Record a finished fetch cycle.
pub fn record_fetch(category: Category, outcome: FetchOutcome) {
    counter!(
        "market_data_fetches_total",
        "category" => category.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record upstream fetch latency.
pub fn record_fetch_duration(category: Category, duration: Duration) {
    histogram!(
        "market_data_fetch_duration_seconds",
        "category" => category.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Set the size of the active snapshot.
pub fn set_snapshot_records(category: Category, records: usize) {
    gauge!(
        "market_data_snapshot_records",
        "category" => category.as_str()
    )
    .set(records as f64);
}

/// Flag whether a category is serving fallback data.
pub fn set_fallback_active(category: Category, active: bool) {
    gauge!(
        "market_data_fallback_active",
        "category" => category.as_str()
    )
    .set(if active { 1.0 } else { 0.0 });
}

/// Record a manual refresh request.
pub fn record_manual_refresh(category: Category) {
    counter!(
        "market_data_manual_refreshes_total",
        "category" => category.as_str()
    )
    .increment(1);
}
