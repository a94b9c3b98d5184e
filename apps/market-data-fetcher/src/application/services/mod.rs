//! Application Services
//!
//! - `MarketDataFetcher`: periodic fetch loop for one source
//! - `Dashboard`: one fetcher per category, stopped together

mod dashboard;
mod fetcher;

pub use dashboard::{Dashboard, DashboardFeeds, DashboardSources, RefreshIntervals};
pub use fetcher::{FeedHandle, MarketDataFetcher};
