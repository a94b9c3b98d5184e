//! Equity Bars and Summary
//!
//! An equity snapshot is a short OHLCV history for one symbol, ordered
//! most-recent-first, plus a summary derived from it: latest price, period
//! high/low, cumulative volume, and the change against the previous bar.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::format::{format_decimal, format_decimal_grouped};

/// Decimals shown for equity prices.
const PRICE_DP: u32 = 2;

/// Bars shown in the chronological chart window.
pub const CHART_WINDOW: usize = 30;

/// Bars shown in the recent-bars table.
pub const TABLE_WINDOW: usize = 10;

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityBar {
    /// Bar open time (exchange local).
    pub datetime: NaiveDateTime,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Shares traded.
    pub volume: Decimal,
}

impl EquityBar {
    /// `HH:MM` label for chart axes.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.datetime.format("%H:%M").to_string()
    }
}

/// Errors deriving a summary from a bar series.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    /// A summary needs the latest bar and the one before it.
    #[error("need at least 2 bars to summarize, got {0}")]
    InsufficientBars(usize),
}

/// Bar history for one symbol, most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquitySeries {
    symbol: String,
    interval: String,
    bars: Vec<EquityBar>,
}

impl EquitySeries {
    /// Create a series. Bars are re-ordered most-recent-first.
    #[must_use]
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>, mut bars: Vec<EquityBar>) -> Self {
        bars.sort_by(|a, b| b.datetime.cmp(&a.datetime));
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            bars,
        }
    }

    /// Ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Bar interval (e.g. `1min`).
    #[must_use]
    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// All bars, most-recent-first.
    #[must_use]
    pub fn bars(&self) -> &[EquityBar] {
        &self.bars
    }

    /// The latest `n` bars, most-recent-first.
    #[must_use]
    pub fn latest(&self, n: usize) -> &[EquityBar] {
        &self.bars[..n.min(self.bars.len())]
    }

    /// The latest `n` bars, oldest-first.
    #[must_use]
    pub fn chronological(&self, n: usize) -> Vec<EquityBar> {
        self.latest(n).iter().rev().cloned().collect()
    }

    /// Derive the period summary.
    pub fn summarize(&self) -> Result<EquitySummary, SummaryError> {
        let [latest, previous, ..] = self.bars.as_slice() else {
            return Err(SummaryError::InsufficientBars(self.bars.len()));
        };

        let high = self
            .bars
            .iter()
            .map(|bar| bar.high)
            .max()
            .unwrap_or(latest.high);
        let low = self
            .bars
            .iter()
            .map(|bar| bar.low)
            .min()
            .unwrap_or(latest.low);
        let volume: Decimal = self.bars.iter().map(|bar| bar.volume).sum();

        let change = latest.close - previous.close;
        let change_percent = change
            .checked_div(previous.close)
            .map_or(Decimal::ZERO, |ratio| ratio * Decimal::ONE_HUNDRED);

        Ok(EquitySummary {
            symbol: self.symbol.clone(),
            current: latest.close,
            open: latest.open,
            high,
            low,
            volume,
            change,
            change_percent,
            is_up: change > Decimal::ZERO,
            current_display: format_decimal(latest.close, PRICE_DP),
            open_display: format_decimal(latest.open, PRICE_DP),
            high_display: format_decimal(high, PRICE_DP),
            low_display: format_decimal(low, PRICE_DP),
            volume_display: format_decimal_grouped(volume),
            change_display: format_decimal(change, PRICE_DP),
            change_percent_display: format!("{}%", format_decimal(change_percent.abs(), PRICE_DP)),
        })
    }
}

/// Period summary of an equity series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquitySummary {
    /// Ticker symbol.
    pub symbol: String,
    /// Latest close.
    pub current: Decimal,
    /// Latest open.
    pub open: Decimal,
    /// Highest high across the series.
    pub high: Decimal,
    /// Lowest low across the series.
    pub low: Decimal,
    /// Total volume across the series.
    pub volume: Decimal,
    /// Latest close minus previous close.
    pub change: Decimal,
    /// `change` as a percentage of the previous close.
    pub change_percent: Decimal,
    /// Whether `change` is strictly positive.
    pub is_up: bool,
    /// Latest close, two decimals.
    pub current_display: String,
    /// Latest open, two decimals.
    pub open_display: String,
    /// Period high, two decimals.
    pub high_display: String,
    /// Period low, two decimals.
    pub low_display: String,
    /// Period volume with thousands separators.
    pub volume_display: String,
    /// Point change, two decimals, signed.
    pub change_display: String,
    /// Absolute percent change, two decimals. Direction is in `is_up`.
    pub change_percent_display: String,
}

/// Close price at one bar, for the price chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// `HH:MM` label.
    pub time: String,
    /// Close price.
    pub close: Decimal,
}

impl From<&EquityBar> for ChartPoint {
    fn from(bar: &EquityBar) -> Self {
        Self {
            time: bar.time_label(),
            close: bar.close,
        }
    }
}

/// Display record for the equity category: the summary, a bounded
/// most-recent-first history, and an oldest-first chart window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityQuote {
    /// Derived summary.
    pub summary: EquitySummary,
    /// Bounded history, most-recent-first.
    pub history: Vec<EquityBar>,
    /// Up to [`CHART_WINDOW`] close prices, oldest-first.
    pub chart: Vec<ChartPoint>,
}

impl EquityQuote {
    /// Build a display record from a series, keeping at most `history_len`
    /// bars of history.
    pub fn from_series(series: &EquitySeries, history_len: usize) -> Result<Self, SummaryError> {
        Ok(Self {
            summary: series.summarize()?,
            history: series.latest(history_len).to_vec(),
            chart: series
                .chronological(CHART_WINDOW)
                .iter()
                .map(ChartPoint::from)
                .collect(),
        })
    }
}

/// Last two AAPL minute bars, shown when the equity snapshot cannot be read.
#[must_use]
pub fn fallback_equity_quotes() -> Vec<EquityQuote> {
    let at = |minute: u32| {
        NaiveDate::from_ymd_opt(2026, 2, 13)
            .and_then(|date| date.and_hms_opt(15, minute, 0))
            .unwrap_or_default()
    };
    let bars = vec![
        EquityBar {
            datetime: at(59),
            open: Decimal::new(25_599_001, 5),
            high: Decimal::new(25_601_001, 5),
            low: Decimal::new(25_559, 2),
            close: Decimal::new(25_582_001, 5),
            volume: Decimal::from(1_420_615),
        },
        EquityBar {
            datetime: at(58),
            open: Decimal::new(2_559_688, 4),
            high: Decimal::new(25_603, 2),
            low: Decimal::new(25_583_009, 5),
            close: Decimal::new(25_599_001, 5),
            volume: Decimal::from(420_732),
        },
    ];

    let series = EquitySeries::new("AAPL", "1min", bars);
    EquityQuote::from_series(&series, TABLE_WINDOW)
        .map(|quote| vec![quote])
        .unwrap_or_default()
}
