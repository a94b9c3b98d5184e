//! Crypto Display Records

use serde::{Deserialize, Serialize};

use crate::domain::format::{format_compact_usd, format_signed_percent, format_usd_price, is_up};

/// Raw market values for one coin, as reported by a market-data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoMarket {
    /// Provider identifier (e.g. `bitcoin`).
    pub id: String,
    /// Ticker symbol in any case.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Spot price in the quote currency.
    pub price: f64,
    /// Signed 24h percent change, if reported.
    pub change_24h: Option<f64>,
    /// Market capitalization.
    pub market_cap: f64,
    /// 24h trading volume.
    pub volume: f64,
    /// Icon URL.
    pub image: Option<String>,
    /// Market-cap rank.
    pub rank: u32,
}

/// Normalized crypto quote ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    /// Provider identifier.
    pub id: String,
    /// Upper-case ticker symbol.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Spot price.
    pub price: f64,
    /// Spot price formatted as dollars.
    pub price_display: String,
    /// Signed 24h percent change (0 when unreported).
    pub change_24h: f64,
    /// 24h change formatted as a signed percentage.
    pub change_display: String,
    /// Whether the 24h change is strictly positive.
    pub is_up: bool,
    /// Market capitalization, compact dollars.
    pub market_cap_display: String,
    /// 24h volume, compact dollars.
    pub volume_display: String,
    /// Icon URL.
    pub image: Option<String>,
    /// Market-cap rank.
    pub rank: u32,
}

impl From<CryptoMarket> for CryptoQuote {
    fn from(market: CryptoMarket) -> Self {
        let change_24h = market.change_24h.unwrap_or_default();
        Self {
            id: market.id,
            symbol: market.symbol.to_uppercase(),
            name: market.name,
            price: market.price,
            price_display: format_usd_price(market.price),
            change_24h,
            change_display: format_signed_percent(change_24h),
            is_up: is_up(change_24h),
            market_cap_display: format_compact_usd(market.market_cap),
            volume_display: format_compact_usd(market.volume),
            image: market.image,
            rank: market.rank,
        }
    }
}

/// Top-ten coins shown when the live crypto fetch fails.
#[must_use]
pub fn fallback_crypto_quotes() -> Vec<CryptoQuote> {
    const COINS: [(&str, &str, &str, f64, f64, f64, f64); 10] = [
        ("bitcoin", "BTC", "Bitcoin", 45_230.0, 2.34, 880e9, 45e9),
        ("ethereum", "ETH", "Ethereum", 2_450.0, 1.85, 295e9, 18e9),
        ("binancecoin", "BNB", "Binance Coin", 315.0, -0.45, 47e9, 2.5e9),
        ("solana", "SOL", "Solana", 98.0, 5.67, 42e9, 3.2e9),
        ("ripple", "XRP", "Ripple", 0.62, 0.89, 35e9, 1.8e9),
        ("cardano", "ADA", "Cardano", 0.48, -1.23, 17e9, 890e6),
        ("avalanche", "AVAX", "Avalanche", 36.50, 3.45, 14e9, 760e6),
        ("dogecoin", "DOGE", "Dogecoin", 0.085, 0.56, 12e9, 650e6),
        ("polkadot", "DOT", "Polkadot", 7.25, -0.78, 9.5e9, 420e6),
        ("polygon", "MATIC", "Polygon", 0.92, 2.10, 8.5e9, 380e6),
    ];

    COINS
        .iter()
        .zip(1u32..)
        .map(|(&(id, symbol, name, price, change, market_cap, volume), rank)| {
            CryptoQuote::from(CryptoMarket {
                id: id.to_string(),
                symbol: symbol.to_string(),
                name: name.to_string(),
                price,
                change_24h: Some(change),
                market_cap,
                volume,
                image: None,
                rank,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(change_24h: Option<f64>) -> CryptoMarket {
        CryptoMarket {
            id: "bitcoin".to_string(),
            symbol: "btc".to_string(),
            name: "Bitcoin".to_string(),
            price: 67_123.45,
            change_24h,
            market_cap: 1_320_000_000_000.0,
            volume: 28_400_000_000.0,
            image: Some("https://assets.example/btc.png".to_string()),
            rank: 1,
        }
    }

    #[test]
    fn normalizes_market_values() {
        let quote = CryptoQuote::from(market(Some(2.346)));

        assert_eq!(quote.symbol, "BTC");
        assert_eq!(quote.price_display, "$67,123.45");
        assert_eq!(quote.change_display, "+2.35%");
        assert!(quote.is_up);
        assert_eq!(quote.market_cap_display, "$1.32T");
        assert_eq!(quote.volume_display, "$28.40B");
        assert_eq!(quote.rank, 1);
    }

    #[test]
    fn missing_change_is_flat_and_not_up() {
        let quote = CryptoQuote::from(market(None));
        assert_eq!(quote.change_24h, 0.0);
        assert_eq!(quote.change_display, "0.00%");
        assert!(!quote.is_up);
    }

    #[test]
    fn negative_change_is_down() {
        let quote = CryptoQuote::from(market(Some(-1.5)));
        assert!(!quote.is_up);
        assert_eq!(quote.change_display, "-1.50%");
    }

    #[test]
    fn fallback_is_ranked_top_ten() {
        let quotes = fallback_crypto_quotes();
        assert_eq!(quotes.len(), 10);
        assert_eq!(quotes[0].symbol, "BTC");
        assert_eq!(quotes[0].price_display, "$45,230");
        assert_eq!(quotes[0].market_cap_display, "$880.00B");
        assert_eq!(quotes[2].change_display, "-0.45%");
        assert!(!quotes[2].is_up);
        assert!(quotes.iter().zip(1u32..).all(|(q, rank)| q.rank == rank));
    }
}
