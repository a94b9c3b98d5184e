//! Market Dashboard
//!
//! Owns one fetcher per category. The fetchers share nothing but a
//! cancellation token: each holds its own snapshot, loading flag and error.
//! Dropping or shutting down the dashboard stops every schedule.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::fetcher::{FeedHandle, MarketDataFetcher};
use crate::application::ports::MarketDataSource;
use crate::domain::feed::{Category, FeedSummary};
use crate::domain::quotes::{CryptoQuote, EquityQuote, ForexQuote};

/// Upstream source for each category.
pub struct DashboardSources {
    /// Crypto source.
    pub crypto: Arc<dyn MarketDataSource<Record = CryptoQuote>>,
    /// Forex source.
    pub forex: Arc<dyn MarketDataSource<Record = ForexQuote>>,
    /// Equity source.
    pub equity: Arc<dyn MarketDataSource<Record = EquityQuote>>,
}

/// Refresh interval for each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshIntervals {
    /// Crypto refresh interval.
    pub crypto: Duration,
    /// Forex refresh interval.
    pub forex: Duration,
    /// Equity refresh interval.
    pub equity: Duration,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            crypto: Duration::from_secs(60),
            forex: Duration::from_secs(30),
            equity: Duration::from_secs(300),
        }
    }
}

/// Read handles for every category.
#[derive(Clone)]
pub struct DashboardFeeds {
    /// Crypto feed.
    pub crypto: FeedHandle<CryptoQuote>,
    /// Forex feed.
    pub forex: FeedHandle<ForexQuote>,
    /// Equity feed.
    pub equity: FeedHandle<EquityQuote>,
}

impl DashboardFeeds {
    /// Request an immediate re-fetch for one category.
    pub fn refresh(&self, category: Category) {
        match category {
            Category::Crypto => self.crypto.refresh(),
            Category::Forex => self.forex.refresh(),
            Category::Equity => self.equity.refresh(),
        }
    }

    /// Record-free state of one category.
    #[must_use]
    pub fn summary(&self, category: Category) -> FeedSummary {
        match category {
            Category::Crypto => self.crypto.snapshot().summary(),
            Category::Forex => self.forex.snapshot().summary(),
            Category::Equity => self.equity.snapshot().summary(),
        }
    }

    /// Record-free state of every category.
    #[must_use]
    pub fn summaries(&self) -> Vec<FeedSummary> {
        Category::ALL.iter().map(|&c| self.summary(c)).collect()
    }
}

/// Running set of category fetchers.
pub struct Dashboard {
    feeds: DashboardFeeds,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Dashboard {
    /// Spawn one fetcher per category. Must be called inside a tokio runtime.
    ///
    /// The dashboard stops when `parent` is cancelled, when
    /// [`shutdown`](Self::shutdown) is called, or when it is dropped.
    #[must_use]
    pub fn start(
        sources: DashboardSources,
        intervals: RefreshIntervals,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();

        let (crypto, crypto_handle) =
            MarketDataFetcher::new(sources.crypto, intervals.crypto, cancel.clone());
        let (forex, forex_handle) =
            MarketDataFetcher::new(sources.forex, intervals.forex, cancel.clone());
        let (equity, equity_handle) =
            MarketDataFetcher::new(sources.equity, intervals.equity, cancel.clone());

        let tasks = vec![crypto.spawn(), forex.spawn(), equity.spawn()];

        tracing::info!(
            crypto_interval_secs = intervals.crypto.as_secs(),
            forex_interval_secs = intervals.forex.as_secs(),
            equity_interval_secs = intervals.equity.as_secs(),
            "Dashboard started"
        );

        Self {
            feeds: DashboardFeeds {
                crypto: crypto_handle,
                forex: forex_handle,
                equity: equity_handle,
            },
            cancel,
            tasks,
        }
    }

    /// Read handles.
    #[must_use]
    pub const fn feeds(&self) -> &DashboardFeeds {
        &self.feeds
    }

    /// Stop every fetcher and wait for in-flight fetches to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Fetcher task failed");
            }
        }
        tracing::info!("Dashboard stopped");
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
