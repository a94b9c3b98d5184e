//! Market Data Port (Driven Port)
//!
//! Interface for fetching one category's snapshot from an upstream provider.

use async_trait::async_trait;

use crate::domain::feed::Category;

/// Why a fetch produced no snapshot.
///
/// Every variant is handled the same way by the fetcher: the message is
/// recorded and the source's fallback dataset is served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure (DNS, connect, TLS, reset, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status.
    #[error("HTTP status {status}")]
    Status {
        /// Status code.
        status: u16,
    },

    /// Payload did not have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Upstream answered 2xx but reported an error in the body.
    #[error("provider error {code}: {message}")]
    Api {
        /// Provider error code.
        code: i64,
        /// Provider error message.
        message: String,
    },

    /// Payload parsed but contained none of the requested instruments.
    #[error("no instruments in payload")]
    Empty,

    /// A required credential is not configured.
    #[error("missing credential: {0}")]
    MissingCredentials(&'static str),
}

impl FetchError {
    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
            Self::Api { .. } => "api",
            Self::Empty => "empty",
            Self::MissingCredentials(_) => "credentials",
        }
    }
}

/// Port for one category's upstream provider.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Display record produced by this source.
    type Record: Clone + Send + Sync + 'static;

    /// Category served.
    fn category(&self) -> Category;

    /// Fetch and normalize a complete snapshot.
    async fn fetch(&self) -> Result<Vec<Self::Record>, FetchError>;

    /// Fixed dataset served when `fetch` fails.
    fn fallback(&self) -> Vec<Self::Record>;
}
