//! Feed State
//!
//! Each data category owns one [`FeedState`]: the active snapshot plus its
//! loading/error status. State is an immutable value; a fetch cycle moves it
//! forward by applying [`FeedEvent`]s:
//!
//! ```text
//! Idle ──Started──► Loading ──Succeeded──► Ready
//!                      ▲    └─Failed─────► Degraded (fallback records)
//!                      └──────Started────────┘
//! ```
//!
//! A snapshot is replaced wholesale; records from different fetches are
//! never merged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Category
// =============================================================================

/// Market data category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Top cryptocurrencies by market cap.
    Crypto,
    /// Major currency pairs.
    Forex,
    /// Equity bar history.
    Equity,
}

impl Category {
    /// All categories.
    pub const ALL: [Self; 3] = [Self::Crypto, Self::Forex, Self::Equity];

    /// Lowercase category name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Forex => "forex",
            Self::Equity => "equity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crypto" => Ok(Self::Crypto),
            "forex" => Ok(Self::Forex),
            "equity" | "stocks" => Ok(Self::Equity),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

// =============================================================================
// Status and Events
// =============================================================================

/// Lifecycle status of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    /// No fetch has started yet.
    Idle,
    /// A fetch is in flight; the previous snapshot is still held.
    Loading,
    /// The snapshot came from a successful fetch.
    Ready,
    /// The last fetch failed; the snapshot is the fallback dataset.
    Degraded,
}

impl FeedStatus {
    /// Status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
        }
    }
}

/// Event that moves a feed forward.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent<R> {
    /// A fetch was issued.
    Started,
    /// The fetch returned records.
    Succeeded {
        /// The new snapshot.
        records: Vec<R>,
        /// Completion time.
        at: DateTime<Utc>,
    },
    /// The fetch failed; serve the fallback dataset.
    Failed {
        /// Human-readable error.
        message: String,
        /// Fallback dataset that replaces the snapshot.
        fallback: Vec<R>,
    },
}

// =============================================================================
// Feed State
// =============================================================================

/// Snapshot and status for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedState<R> {
    category: Category,
    status: FeedStatus,
    records: Vec<R>,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    last_updated_label: Option<String>,
    completed_fetches: u64,
}

impl<R: Clone> FeedState<R> {
    /// Initial state: no records, nothing fetched.
    #[must_use]
    pub const fn idle(category: Category) -> Self {
        Self {
            category,
            status: FeedStatus::Idle,
            records: Vec::new(),
            error: None,
            last_updated: None,
            last_updated_label: None,
            completed_fetches: 0,
        }
    }

    /// Apply an event, returning the next state.
    #[must_use]
    pub fn apply(&self, event: FeedEvent<R>) -> Self {
        match event {
            FeedEvent::Started => Self {
                status: FeedStatus::Loading,
                ..self.clone()
            },
            FeedEvent::Succeeded { records, at } => Self {
                category: self.category,
                status: FeedStatus::Ready,
                records,
                error: None,
                last_updated: Some(at),
                last_updated_label: Some(at.format("%H:%M:%S UTC").to_string()),
                completed_fetches: self.completed_fetches + 1,
            },
            FeedEvent::Failed { message, fallback } => Self {
                category: self.category,
                status: FeedStatus::Degraded,
                records: fallback,
                error: Some(message),
                last_updated: self.last_updated,
                last_updated_label: self.last_updated_label.clone(),
                completed_fetches: self.completed_fetches + 1,
            },
        }
    }

    /// Category this feed serves.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> FeedStatus {
        self.status
    }

    /// Active snapshot.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Error from the last fetch, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Time of the last successful fetch.
    #[must_use]
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Human-readable time of the last successful fetch.
    #[must_use]
    pub fn last_updated_label(&self) -> Option<&str> {
        self.last_updated_label.as_deref()
    }

    /// Number of fetch cycles that have finished, successful or not.
    #[must_use]
    pub const fn completed_fetches(&self) -> u64 {
        self.completed_fetches
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, FeedStatus::Loading)
    }

    /// Record-free view of this state.
    #[must_use]
    pub fn summary(&self) -> FeedSummary {
        FeedSummary {
            category: self.category,
            status: self.status,
            records: self.records.len(),
            error: self.error.clone(),
            last_updated: self.last_updated,
            completed_fetches: self.completed_fetches,
        }
    }
}

/// Record-free view of a feed, for health reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedSummary {
    /// Category.
    pub category: Category,
    /// Current status.
    pub status: FeedStatus,
    /// Number of records in the active snapshot.
    pub records: usize,
    /// Error from the last fetch.
    pub error: Option<String>,
    /// Time of the last successful fetch.
    pub last_updated: Option<DateTime<Utc>>,
    /// Finished fetch cycles.
    pub completed_fetches: u64,
}

// =============================================================================
// Tests
// =============================================================================
