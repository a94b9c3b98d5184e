//! Forex Display Records

use serde::{Deserialize, Serialize};

use crate::domain::format::{format_fixed, format_signed_percent, is_up};

/// Decimals shown for forex rates.
const RATE_DECIMALS: usize = 4;

/// Raw quote values for one currency pair. Any field may be missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForexTick {
    /// Pair code without separator (e.g. `EURUSD`).
    pub code: String,
    /// Last traded rate.
    pub last: Option<f64>,
    /// Signed percent change.
    pub change_percent: Option<f64>,
    /// Session high.
    pub high: Option<f64>,
    /// Session low.
    pub low: Option<f64>,
    /// Session open.
    pub open: Option<f64>,
    /// Traded volume.
    pub volume: Option<f64>,
}

/// Normalized forex quote ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForexQuote {
    /// Pair label (e.g. `EUR/USD`).
    pub pair: String,
    /// Last rate, four decimals.
    pub price: String,
    /// Signed percent change (0 when unreported).
    pub change_percent: f64,
    /// Percent change formatted with sign.
    pub change_display: String,
    /// Whether the change is strictly positive.
    pub is_up: bool,
    /// Session high, four decimals.
    pub high: String,
    /// Session low, four decimals.
    pub low: String,
    /// Session open, four decimals.
    pub open: String,
    /// Traded volume; providers usually report zero for spot forex.
    pub volume: f64,
}

impl From<ForexTick> for ForexQuote {
    fn from(tick: ForexTick) -> Self {
        let change_percent = tick.change_percent.unwrap_or_default();
        Self {
            pair: pair_label(&tick.code),
            price: rate_or_zero(tick.last),
            change_percent,
            change_display: format_signed_percent(change_percent),
            is_up: is_up(change_percent),
            high: rate_or_zero(tick.high),
            low: rate_or_zero(tick.low),
            open: rate_or_zero(tick.open),
            volume: tick.volume.unwrap_or_default(),
        }
    }
}

/// Insert a `/` between base and quote currency: `EURUSD` becomes `EUR/USD`.
#[must_use]
pub fn pair_label(code: &str) -> String {
    if code.len() > 3 && code.is_char_boundary(3) {
        let (base, quote) = code.split_at(3);
        format!("{base}/{quote}")
    } else {
        code.to_string()
    }
}

fn rate_or_zero(rate: Option<f64>) -> String {
    rate.map_or_else(|| "0".to_string(), |r| format_fixed(r, RATE_DECIMALS))
}

/// Major pairs shown when the live forex fetch fails.
#[must_use]
pub fn fallback_forex_quotes() -> Vec<ForexQuote> {
    const PAIRS: [(&str, f64, f64, f64, f64, f64); 10] = [
        ("EURUSD", 1.0850, 0.12, 1.0875, 1.0820, 1.0830),
        ("GBPUSD", 1.2640, -0.08, 1.2680, 1.2615, 1.2650),
        ("USDJPY", 148.50, 0.25, 148.80, 148.10, 148.30),
        ("AUDUSD", 0.6580, 0.18, 0.6595, 0.6560, 0.6570),
        ("USDCAD", 1.3420, -0.15, 1.3450, 1.3400, 1.3430),
        ("NZDUSD", 0.6120, 0.22, 0.6135, 0.6095, 0.6110),
        ("USDCHF", 0.8750, -0.10, 0.8775, 0.8730, 0.8760),
        ("EURGBP", 0.8585, 0.05, 0.8600, 0.8570, 0.8580),
        ("EURJPY", 161.15, 0.35, 161.50, 160.80, 160.90),
        ("GBPJPY", 187.75, 0.18, 188.20, 187.30, 187.50),
    ];

    PAIRS
        .iter()
        .map(|&(code, last, change, high, low, open)| {
            ForexQuote::from(ForexTick {
                code: code.to_string(),
                last: Some(last),
                change_percent: Some(change),
                high: Some(high),
                low: Some(low),
                open: Some(open),
                volume: Some(0.0),
            })
        })
        .collect()
}
