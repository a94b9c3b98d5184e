//! Fetch Schedule Integration Tests
//!
//! Drives fetchers and the dashboard on tokio's paused clock: one fetch at
//! start, one per interval after that, manual refresh on demand, and nothing
//! after shutdown.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use market_data_fetcher::domain::quotes::{
    fallback_crypto_quotes, fallback_equity_quotes, fallback_forex_quotes,
};
use market_data_fetcher::{
    Category, CryptoQuote, Dashboard, DashboardSources, EquityQuote, FeedStatus, FetchError,
    ForexQuote, MarketDataFetcher, MarketDataSource, RefreshIntervals,
};

const MINUTE: Duration = Duration::from_secs(60);

struct CountingSource<R> {
    category: Category,
    records: Vec<R>,
    calls: Arc<AtomicUsize>,
}

impl<R> CountingSource<R> {
    fn new(category: Category, records: Vec<R>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            category,
            records,
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> MarketDataSource for CountingSource<R> {
    type Record = R;

    fn category(&self) -> Category {
        self.category
    }

    async fn fetch(&self) -> Result<Vec<R>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }

    fn fallback(&self) -> Vec<R> {
        Vec::new()
    }
}

fn spawn_counting(
    interval: Duration,
    cancel: &CancellationToken,
) -> (
    tokio::task::JoinHandle<()>,
    market_data_fetcher::FeedHandle<u32>,
    Arc<AtomicUsize>,
) {
    let (source, calls) = CountingSource::new(Category::Crypto, vec![1, 2, 3]);
    let source: Arc<dyn MarketDataSource<Record = u32>> = Arc::new(source);
    let (fetcher, handle) = MarketDataFetcher::new(source, interval, cancel.clone());
    (fetcher.spawn(), handle, calls)
}

#[tokio::test(start_paused = true)]
async fn fetches_once_at_start_and_once_per_interval() {
    let cancel = CancellationToken::new();
    let (task, handle, calls) = spawn_counting(MINUTE, &cancel);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(handle.snapshot().status(), FeedStatus::Ready);

    // Ticks at 60s, 120s and 180s.
    sleep(MINUTE * 3).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(handle.snapshot().completed_fetches(), 4);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_further_fetches() {
    let cancel = CancellationToken::new();
    let (task, _handle, calls) = spawn_counting(MINUTE, &cancel);

    sleep(MINUTE + Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    cancel.cancel();
    task.await.unwrap();

    sleep(MINUTE * 10).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_fetches_immediately() {
    let cancel = CancellationToken::new();
    let (task, handle, calls) = spawn_counting(MINUTE * 60, &cancel);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    handle.refresh();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dashboard_runs_categories_independently() {
    let (crypto, crypto_calls) = CountingSource::new(Category::Crypto, fallback_crypto_quotes());
    let (forex, forex_calls) = CountingSource::new(Category::Forex, fallback_forex_quotes());
    let (equity, equity_calls) = CountingSource::new(Category::Equity, fallback_equity_quotes());

    let sources = DashboardSources {
        crypto: Arc::new(crypto) as Arc<dyn MarketDataSource<Record = CryptoQuote>>,
        forex: Arc::new(forex) as Arc<dyn MarketDataSource<Record = ForexQuote>>,
        equity: Arc::new(equity) as Arc<dyn MarketDataSource<Record = EquityQuote>>,
    };
    let parent = CancellationToken::new();
    let dashboard = Dashboard::start(sources, RefreshIntervals::default(), &parent);

    // Forex ticks at 30s and 60s, crypto at 60s, equity not yet.
    sleep(MINUTE + Duration::from_secs(1)).await;
    assert_eq!(crypto_calls.load(Ordering::SeqCst), 2);
    assert_eq!(forex_calls.load(Ordering::SeqCst), 3);
    assert_eq!(equity_calls.load(Ordering::SeqCst), 1);

    let summaries = dashboard.feeds().summaries();
    assert_eq!(summaries.len(), 3);
    assert!(summaries.iter().all(|s| s.status == FeedStatus::Ready));
    assert_eq!(summaries[0].records, 10);

    dashboard.shutdown().await;

    sleep(MINUTE * 10).await;
    assert_eq!(crypto_calls.load(Ordering::SeqCst), 2);
    assert_eq!(forex_calls.load(Ordering::SeqCst), 3);
    assert_eq!(equity_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_dashboard_stops_fetchers() {
    let (crypto, crypto_calls) = CountingSource::new(Category::Crypto, fallback_crypto_quotes());
    let (forex, _) = CountingSource::new(Category::Forex, fallback_forex_quotes());
    let (equity, _) = CountingSource::new(Category::Equity, fallback_equity_quotes());

    let sources = DashboardSources {
        crypto: Arc::new(crypto) as Arc<dyn MarketDataSource<Record = CryptoQuote>>,
        forex: Arc::new(forex) as Arc<dyn MarketDataSource<Record = ForexQuote>>,
        equity: Arc::new(equity) as Arc<dyn MarketDataSource<Record = EquityQuote>>,
    };
    let dashboard = Dashboard::start(sources, RefreshIntervals::default(), &CancellationToken::new());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(crypto_calls.load(Ordering::SeqCst), 1);

    drop(dashboard);

    sleep(MINUTE * 10).await;
    assert_eq!(crypto_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn parent_cancellation_stops_dashboard() {
    let (crypto, crypto_calls) = CountingSource::new(Category::Crypto, fallback_crypto_quotes());
    let (forex, _) = CountingSource::new(Category::Forex, fallback_forex_quotes());
    let (equity, _) = CountingSource::new(Category::Equity, fallback_equity_quotes());

    let sources = DashboardSources {
        crypto: Arc::new(crypto) as Arc<dyn MarketDataSource<Record = CryptoQuote>>,
        forex: Arc::new(forex) as Arc<dyn MarketDataSource<Record = ForexQuote>>,
        equity: Arc::new(equity) as Arc<dyn MarketDataSource<Record = EquityQuote>>,
    };
    let parent = CancellationToken::new();
    let _dashboard = Dashboard::start(sources, RefreshIntervals::default(), &parent);

    sleep(Duration::from_secs(1)).await;
    parent.cancel();

    sleep(MINUTE * 10).await;
    assert_eq!(crypto_calls.load(Ordering::SeqCst), 1);
}
