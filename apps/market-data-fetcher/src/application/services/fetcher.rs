//! Scheduled Fetcher
//!
//! Drives one [`MarketDataSource`] on a fixed interval and publishes each
//! resulting [`FeedState`] through a `watch` channel. The first fetch runs
//! immediately; later fetches run once per interval, or early when a manual
//! refresh is requested. A slow fetch delays the next tick rather than
//! queueing a burst of catch-up fetches.
//!
//! Cancellation is checked between fetches only. A fetch that is already in
//! flight runs to completion.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::ports::MarketDataSource;
use crate::domain::feed::{Category, FeedEvent, FeedState};
use crate::infrastructure::metrics::{self, FetchOutcome};

/// Smallest allowed refresh interval.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Read side of a fetcher: current snapshot, change notifications, and the
/// manual refresh trigger.
#[derive(Clone)]
pub struct FeedHandle<R> {
    category: Category,
    state: watch::Receiver<FeedState<R>>,
    refresh: Arc<Notify>,
}

impl<R: Clone> FeedHandle<R> {
    /// Category this feed serves.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> FeedState<R> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedState<R>> {
        self.state.clone()
    }

    /// Request an immediate re-fetch.
    ///
    /// Requests made while a fetch is in flight collapse into one follow-up
    /// fetch.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }
}

/// Periodic fetch loop for one category.
pub struct MarketDataFetcher<R> {
    source: Arc<dyn MarketDataSource<Record = R>>,
    interval: Duration,
    state: watch::Sender<FeedState<R>>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
}

impl<R: Clone + Send + Sync + 'static> MarketDataFetcher<R> {
    /// Create a fetcher and its read handle. Nothing runs until
    /// [`run`](Self::run) or [`spawn`](Self::spawn).
    #[must_use]
    pub fn new(
        source: Arc<dyn MarketDataSource<Record = R>>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> (Self, FeedHandle<R>) {
        let category = source.category();
        let (state, state_rx) = watch::channel(FeedState::idle(category));
        let refresh = Arc::new(Notify::new());

        let handle = FeedHandle {
            category,
            state: state_rx,
            refresh: Arc::clone(&refresh),
        };

        let fetcher = Self {
            source,
            interval: interval.max(MIN_INTERVAL),
            state,
            refresh,
            cancel,
        };

        (fetcher, handle)
    }

    /// Run the loop on a new task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the loop until cancelled.
    pub async fn run(self) {
        let category = self.source.category();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            category = %category,
            interval_secs = self.interval.as_secs(),
            "Fetcher started"
        );

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
                () = self.refresh.notified() => {
                    tracing::debug!(category = %category, "Manual refresh requested");
                    metrics::record_manual_refresh(category);
                }
            }

            self.fetch_once().await;
        }

        tracing::info!(category = %category, "Fetcher stopped");
    }

    /// Run one fetch cycle and publish the outcome.
    pub async fn fetch_once(&self) {
        let category = self.source.category();
        self.publish(FeedEvent::Started);

        let started = Instant::now();
        let outcome = self.source.fetch().await;
        let elapsed = started.elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        metrics::record_fetch_duration(category, elapsed);

        match outcome {
            Ok(records) => {
                tracing::info!(
                    category = %category,
                    records = records.len(),
                    elapsed_ms,
                    "Snapshot updated"
                );
                metrics::record_fetch(category, FetchOutcome::Success);
                metrics::set_snapshot_records(category, records.len());
                metrics::set_fallback_active(category, false);
                self.publish(FeedEvent::Succeeded {
                    records,
                    at: Utc::now(),
                });
            }
            Err(error) => {
                let fallback = self.source.fallback();
                tracing::warn!(
                    category = %category,
                    error = %error,
                    fallback_records = fallback.len(),
                    elapsed_ms,
                    "Fetch failed, serving fallback"
                );
                metrics::record_fetch(category, FetchOutcome::Failure(error.kind()));
                metrics::set_snapshot_records(category, fallback.len());
                metrics::set_fallback_active(category, true);
                self.publish(FeedEvent::Failed {
                    message: error.to_string(),
                    fallback,
                });
            }
        }
    }

    fn publish(&self, event: FeedEvent<R>) {
        let next = self.state.borrow().apply(event);
        self.state.send_replace(next);
    }
}
