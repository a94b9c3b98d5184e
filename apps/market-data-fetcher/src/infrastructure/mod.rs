//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// CoinGecko crypto market adapter.
pub mod coingecko;

/// iTick forex quote adapter.
pub mod itick;

/// Bundled equity time-series adapter.
pub mod equity;

/// Shared JSON HTTP client.
pub mod http;

/// Configuration from the environment.
pub mod config;

/// Health, metrics and snapshot HTTP endpoint.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
