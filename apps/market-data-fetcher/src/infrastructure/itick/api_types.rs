//! iTick response types.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::quotes::ForexTick;

/// Envelope of `/forex/quotes`. `code == 0` means success.
#[derive(Debug, Clone, Deserialize)]
pub struct ForexQuotesResponse {
    /// Provider status code.
    pub code: i64,
    /// Provider message.
    #[serde(default)]
    pub msg: Option<String>,
    /// Quotes keyed by pair code.
    #[serde(default)]
    pub data: Option<HashMap<String, ForexQuoteData>>,
}

/// Quote fields for one pair. iTick uses terse field names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForexQuoteData {
    /// Last price.
    #[serde(default)]
    pub ld: Option<f64>,
    /// Percent change.
    #[serde(default)]
    pub chp: Option<f64>,
    /// High.
    #[serde(default)]
    pub h: Option<f64>,
    /// Low.
    #[serde(default)]
    pub lo: Option<f64>,
    /// Open.
    #[serde(default)]
    pub o: Option<f64>,
    /// Volume.
    #[serde(default)]
    pub v: Option<f64>,
}

impl ForexQuoteData {
    /// Attach the pair code.
    pub fn into_tick(self, code: &str) -> ForexTick {
        ForexTick {
            code: code.to_string(),
            last: self.ld,
            change_percent: self.chp,
            high: self.h,
            low: self.lo,
            open: self.o,
            volume: self.v,
        }
    }
}
