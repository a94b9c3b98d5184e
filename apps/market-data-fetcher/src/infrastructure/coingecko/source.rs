//! CoinGecko market source.

use async_trait::async_trait;

use super::api_types::CoinMarket;
use crate::application::ports::{FetchError, MarketDataSource};
use crate::domain::feed::Category;
use crate::domain::quotes::{CryptoQuote, fallback_crypto_quotes};
use crate::infrastructure::config::CryptoSettings;
use crate::infrastructure::http::JsonHttpClient;

/// Top coins by market cap from CoinGecko.
#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    http: JsonHttpClient,
    settings: CryptoSettings,
}

impl CoinGeckoSource {
    /// Create a source.
    #[must_use]
    pub const fn new(http: JsonHttpClient, settings: CryptoSettings) -> Self {
        Self { http, settings }
    }

    fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.settings.base_url)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoSource {
    type Record = CryptoQuote;

    fn category(&self) -> Category {
        Category::Crypto
    }

    async fn fetch(&self) -> Result<Vec<CryptoQuote>, FetchError> {
        let per_page = self.settings.per_page.to_string();
        let query = [
            ("vs_currency", self.settings.vs_currency.as_str()),
            ("order", "market_cap_desc"),
            ("per_page", per_page.as_str()),
            ("page", "1"),
            ("sparkline", "false"),
            ("price_change_percentage", "24h"),
        ];

        let coins: Vec<CoinMarket> = self.http.get_json(&self.markets_url(), &query, &[]).await?;

        Ok(coins
            .into_iter()
            .enumerate()
            .map(|(position, coin)| CryptoQuote::from(coin.into_market(position)))
            .collect())
    }

    fn fallback(&self) -> Vec<CryptoQuote> {
        fallback_crypto_quotes()
    }
}
