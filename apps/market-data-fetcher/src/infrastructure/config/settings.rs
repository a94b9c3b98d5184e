//! Fetcher Configuration Settings
//!
//! Configuration types for the fetcher, loaded from environment variables.
//! Unset or unparseable values fall back to defaults; a zero refresh
//! interval is rejected.

use std::time::Duration;

use crate::application::services::RefreshIntervals;

/// Default forex pairs: the ten majors and crosses shown on the dashboard.
pub const DEFAULT_FOREX_PAIRS: [&str; 10] = [
    "EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "USDCAD", "NZDUSD", "USDCHF", "EURGBP", "EURJPY",
    "GBPJPY",
];

/// Provider API token.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a token. Returns `None` for an empty or blank value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

/// CoinGecko settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoSettings {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Quote currency for prices.
    pub vs_currency: String,
    /// Number of coins requested.
    pub per_page: u32,
    /// Refresh interval.
    pub refresh_interval: Duration,
}

impl Default for CryptoSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            per_page: 10,
            refresh_interval: Duration::from_secs(60),
        }
    }
}

/// iTick forex settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForexSettings {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// API token; forex fetches fail without one.
    pub token: Option<ApiToken>,
    /// Market region.
    pub region: String,
    /// Pair codes in display order.
    pub pairs: Vec<String>,
    /// Refresh interval.
    pub refresh_interval: Duration,
}

impl Default for ForexSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.itick.org".to_string(),
            token: None,
            region: "GB".to_string(),
            pairs: DEFAULT_FOREX_PAIRS.iter().map(|p| (*p).to_string()).collect(),
            refresh_interval: Duration::from_secs(30),
        }
    }
}

/// Equity snapshot settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquitySettings {
    /// Bars of history kept on each quote.
    pub history_len: usize,
    /// Refresh interval.
    pub refresh_interval: Duration,
}

impl Default for EquitySettings {
    fn default() -> Self {
        Self {
            history_len: 30,
            refresh_interval: Duration::from_secs(300),
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpSettings {
    /// Per-request timeout; `None` leaves the transport default.
    pub timeout: Option<Duration>,
}

/// Server port settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Health, metrics and snapshot API port.
    pub http_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { http_port: 8083 }
    }
}

/// Complete fetcher configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Crypto source settings.
    pub crypto: CryptoSettings,
    /// Forex source settings.
    pub forex: ForexSettings,
    /// Equity source settings.
    pub equity: EquitySettings,
    /// Outbound HTTP settings.
    pub http: HttpSettings,
    /// Server settings.
    pub server: ServerSettings,
}

impl FetcherConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a refresh interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a refresh interval is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        let defaults = Self::default();

        let crypto = CryptoSettings {
            base_url: env.url("COINGECKO_BASE_URL", &defaults.crypto.base_url),
            vs_currency: env
                .string("CRYPTO_VS_CURRENCY")
                .map_or(defaults.crypto.vs_currency, |v| v.to_lowercase()),
            per_page: env.parse("CRYPTO_PER_PAGE", defaults.crypto.per_page),
            refresh_interval: env.interval(
                "CRYPTO_REFRESH_INTERVAL_SECS",
                defaults.crypto.refresh_interval,
            )?,
        };

        let forex = ForexSettings {
            base_url: env.url("ITICK_BASE_URL", &defaults.forex.base_url),
            token: env.string("ITICK_TOKEN").and_then(ApiToken::new),
            region: env.string("FOREX_REGION").unwrap_or(defaults.forex.region),
            pairs: env
                .string("FOREX_PAIRS")
                .map(|v| parse_pairs(&v))
                .filter(|pairs| !pairs.is_empty())
                .unwrap_or(defaults.forex.pairs),
            refresh_interval: env.interval(
                "FOREX_REFRESH_INTERVAL_SECS",
                defaults.forex.refresh_interval,
            )?,
        };

        let equity = EquitySettings {
            history_len: env.parse("EQUITY_HISTORY_LEN", defaults.equity.history_len),
            refresh_interval: env.interval(
                "EQUITY_REFRESH_INTERVAL_SECS",
                defaults.equity.refresh_interval,
            )?,
        };

        let http = HttpSettings {
            timeout: env
                .string("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
        };

        let server = ServerSettings {
            http_port: env.parse("MARKET_DATA_HTTP_PORT", defaults.server.http_port),
        };

        Ok(Self {
            crypto,
            forex,
            equity,
            http,
            server,
        })
    }

    /// Refresh interval per category.
    #[must_use]
    pub const fn intervals(&self) -> RefreshIntervals {
        RefreshIntervals {
            crypto: self.crypto.refresh_interval,
            forex: self.forex.refresh_interval,
            equity: self.equity.refresh_interval,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A refresh interval of zero would spin the fetch loop.
    #[error("{0} must be greater than zero")]
    ZeroInterval(String),
}

/// Upper-cased, de-separated pair codes from a comma list.
fn parse_pairs(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|p| p.trim().replace('/', "").to_uppercase())
        .filter(|p| !p.is_empty())
        .collect()
}

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.string(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn url(&self, key: &str, default: &str) -> String {
        self.string(key)
            .unwrap_or_else(|| default.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    fn interval(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        let interval = self
            .string(key)
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(default, Duration::from_secs);
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval(key.to_string()));
        }
        Ok(interval)
    }
}
