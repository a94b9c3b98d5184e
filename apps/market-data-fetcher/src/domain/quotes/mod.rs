//! Quote Display Records
//!
//! Normalized, formatted representations of market instruments, one module
//! per data category. Each category also provides the fixed fallback
//! dataset served when its live fetch fails.

mod crypto;
mod equity;
mod forex;

pub use crypto::{CryptoMarket, CryptoQuote, fallback_crypto_quotes};
pub use equity::{
    CHART_WINDOW, ChartPoint, EquityBar, EquityQuote, EquitySeries, EquitySummary, SummaryError,
    TABLE_WINDOW, fallback_equity_quotes,
};
pub use forex::{ForexQuote, ForexTick, fallback_forex_quotes, pair_label};
