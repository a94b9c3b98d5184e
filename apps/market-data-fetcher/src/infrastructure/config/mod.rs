//! Configuration Module
//!
//! Environment-driven configuration for the fetcher service.

mod settings;

pub use settings::{
    ApiToken, ConfigError, CryptoSettings, DEFAULT_FOREX_PAIRS, EquitySettings, FetcherConfig,
    ForexSettings, HttpSettings, ServerSettings,
};
