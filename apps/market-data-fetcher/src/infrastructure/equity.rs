//! Embedded Equity Source
//!
//! Serves a bundled OHLCV time series (AAPL, one-minute bars) in the
//! time-series JSON layout used by common equity data vendors:
//!
//! ```json
//! { "meta": { "symbol": "AAPL", "interval": "1min" },
//!   "values": [ { "datetime": "2026-02-13 15:59:00", "open": "255.99", ... } ],
//!   "status": "ok" }
//! ```
//!
//! Prices and volumes are decimal strings. The payload is re-parsed on every
//! fetch, so the equity feed runs through the same fetch, fail and fallback
//! path as the live categories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::{FetchError, MarketDataSource};
use crate::domain::feed::Category;
use crate::domain::quotes::{EquityBar, EquityQuote, EquitySeries, fallback_equity_quotes};

const EMBEDDED_SERIES: &str = include_str!("../../data/aapl_1min.json");

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TimeSeriesPayload {
    #[serde(default)]
    meta: Option<TimeSeriesMeta>,
    #[serde(default)]
    values: Vec<WireBar>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesMeta {
    symbol: String,
    interval: String,
}

#[derive(Debug, Deserialize)]
struct WireBar {
    datetime: String,
    #[serde(with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    close: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    volume: Decimal,
}

impl TryFrom<WireBar> for EquityBar {
    type Error = FetchError;

    fn try_from(bar: WireBar) -> Result<Self, Self::Error> {
        let datetime = NaiveDateTime::parse_from_str(&bar.datetime, DATETIME_FORMAT)
            .map_err(|e| FetchError::Malformed(format!("bar datetime {:?}: {e}", bar.datetime)))?;
        Ok(Self {
            datetime,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
    }
}

// =============================================================================
// Source
// =============================================================================

/// Equity quotes from a bundled time-series document.
#[derive(Debug, Clone)]
pub struct EmbeddedEquitySource {
    payload: Arc<str>,
    history_len: usize,
}

impl EmbeddedEquitySource {
    /// Source over the bundled AAPL series.
    #[must_use]
    pub fn embedded(history_len: usize) -> Self {
        Self::from_json(EMBEDDED_SERIES, history_len)
    }

    /// Source over an arbitrary time-series document.
    #[must_use]
    pub fn from_json(payload: impl Into<Arc<str>>, history_len: usize) -> Self {
        Self {
            payload: payload.into(),
            history_len,
        }
    }

    fn parse(&self) -> Result<EquitySeries, FetchError> {
        let payload: TimeSeriesPayload = serde_json::from_str(&self.payload)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        if payload.status.as_deref() == Some("error") {
            return Err(FetchError::Api {
                code: payload.code.unwrap_or_default(),
                message: payload.message.unwrap_or_default(),
            });
        }

        let meta = payload
            .meta
            .ok_or_else(|| FetchError::Malformed("missing meta".to_string()))?;
        let bars = payload
            .values
            .into_iter()
            .map(EquityBar::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EquitySeries::new(meta.symbol, meta.interval, bars))
    }
}

#[async_trait]
impl MarketDataSource for EmbeddedEquitySource {
    type Record = EquityQuote;

    fn category(&self) -> Category {
        Category::Equity
    }

    async fn fetch(&self) -> Result<Vec<EquityQuote>, FetchError> {
        let series = self.parse()?;
        let quote = EquityQuote::from_series(&series, self.history_len)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        Ok(vec![quote])
    }

    fn fallback(&self) -> Vec<EquityQuote> {
        fallback_equity_quotes()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn embedded_series_summary() {
        let quotes = EmbeddedEquitySource::embedded(30).fetch().await.unwrap();
        assert_eq!(quotes.len(), 1);

        let quote = &quotes[0];
        let summary = &quote.summary;
        assert_eq!(summary.symbol, "AAPL");
        assert_eq!(summary.current, dec("255.82001"));
        assert_eq!(summary.high, dec("256.67"));
        assert_eq!(summary.low, dec("255.45"));
        assert_eq!(summary.volume, Decimal::from(6_720_926));
        assert_eq!(summary.change, dec("-0.17"));
        assert!(!summary.is_up);
        assert_eq!(summary.change_percent_display, "0.07%");

        assert_eq!(quote.history.len(), 30);
        assert_eq!(quote.history[0].time_label(), "15:59");
        assert_eq!(quote.chart.first().map(|p| p.time.as_str()), Some("15:30"));
        assert_eq!(quote.chart.last().map(|p| p.time.as_str()), Some("15:59"));
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let quotes = EmbeddedEquitySource::embedded(5).fetch().await.unwrap();
        assert_eq!(quotes[0].history.len(), 5);
    }

    #[tokio::test]
    async fn single_bar_is_malformed() {
        let json = r#"{
            "meta": {"symbol": "AAPL", "interval": "1min"},
            "values": [{"datetime": "2026-02-13 15:59:00", "open": "1", "high": "1",
                        "low": "1", "close": "1", "volume": "1"}],
            "status": "ok"
        }"#;
        let err = EmbeddedEquitySource::from_json(json, 10)
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn error_status_is_api_error() {
        let json = r#"{"code": 429, "message": "rate limited", "status": "error"}"#;
        let err = EmbeddedEquitySource::from_json(json, 10)
            .fetch()
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Api {
                code: 429,
                message: "rate limited".to_string()
            }
        );
    }

    #[tokio::test]
    async fn bad_datetime_is_malformed() {
        let json = r#"{
            "meta": {"symbol": "AAPL", "interval": "1min"},
            "values": [{"datetime": "yesterday", "open": "1", "high": "1",
                        "low": "1", "close": "1", "volume": "1"}]
        }"#;
        let err = EmbeddedEquitySource::from_json(json, 10)
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn fallback_is_fixed() {
        assert_eq!(EmbeddedEquitySource::embedded(30).fallback().len(), 1);
    }
}
