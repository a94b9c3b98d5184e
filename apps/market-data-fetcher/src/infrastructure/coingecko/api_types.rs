//! CoinGecko response types.
//!
//! These types map directly to the `/coins/markets` JSON format. Only the
//! price is mandatory; CoinGecko reports `null` for several fields on
//! thinly traded coins.

use serde::Deserialize;

use crate::domain::quotes::CryptoMarket;

/// One entry of the `/coins/markets` array.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarket {
    /// CoinGecko coin id.
    pub id: String,
    /// Ticker, lower-case.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Logo URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Price in the requested currency.
    pub current_price: f64,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Market-cap rank.
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    /// 24h traded volume.
    #[serde(default)]
    pub total_volume: Option<f64>,
    /// 24h percent change.
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl CoinMarket {
    /// Convert to a domain market row. `position` is the zero-based index
    /// in the response, used when CoinGecko omits the rank.
    pub fn into_market(self, position: usize) -> CryptoMarket {
        let rank = self
            .market_cap_rank
            .filter(|&rank| rank > 0)
            .unwrap_or_else(|| u32::try_from(position + 1).unwrap_or(u32::MAX));

        CryptoMarket {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            price: self.current_price,
            change_24h: self.price_change_percentage_24h,
            market_cap: self.market_cap.unwrap_or_default(),
            volume: self.total_volume.unwrap_or_default(),
            image: self.image,
            rank,
        }
    }
}
