//! Application Layer - Ports and fetch orchestration.
//!
//! Defines the contract every market-data source fulfils and the services
//! that drive sources on a schedule and publish their snapshots.

/// Port interfaces for market-data sources.
pub mod ports;

/// Scheduled fetchers and the dashboard that owns them.
pub mod services;
