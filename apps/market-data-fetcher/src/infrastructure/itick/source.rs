//! iTick forex source.

use async_trait::async_trait;

use super::api_types::ForexQuotesResponse;
use crate::application::ports::{FetchError, MarketDataSource};
use crate::domain::feed::Category;
use crate::domain::quotes::{ForexQuote, fallback_forex_quotes};
use crate::infrastructure::config::ForexSettings;
use crate::infrastructure::http::JsonHttpClient;

/// Major currency pairs from iTick.
#[derive(Debug, Clone)]
pub struct ITickSource {
    http: JsonHttpClient,
    settings: ForexSettings,
}

impl ITickSource {
    /// Create a source.
    #[must_use]
    pub const fn new(http: JsonHttpClient, settings: ForexSettings) -> Self {
        Self { http, settings }
    }

    fn quotes_url(&self) -> String {
        format!("{}/forex/quotes", self.settings.base_url)
    }

    /// Map a decoded envelope to display records, in configured pair order.
    /// Pairs absent from the payload are skipped.
    fn normalize(&self, response: ForexQuotesResponse) -> Result<Vec<ForexQuote>, FetchError> {
        if response.code != 0 {
            return Err(FetchError::Api {
                code: response.code,
                message: response.msg.unwrap_or_default(),
            });
        }

        let mut data = response.data.unwrap_or_default();
        let quotes: Vec<ForexQuote> = self
            .settings
            .pairs
            .iter()
            .filter_map(|pair| {
                data.remove(pair)
                    .map(|quote| ForexQuote::from(quote.into_tick(pair)))
            })
            .collect();

        if quotes.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(quotes)
    }
}

#[async_trait]
impl MarketDataSource for ITickSource {
    type Record = ForexQuote;

    fn category(&self) -> Category {
        Category::Forex
    }

    async fn fetch(&self) -> Result<Vec<ForexQuote>, FetchError> {
        let token = self
            .settings
            .token
            .as_ref()
            .ok_or(FetchError::MissingCredentials("ITICK_TOKEN"))?;

        let codes = self.settings.pairs.join(",");
        let query = [
            ("region", self.settings.region.as_str()),
            ("codes", codes.as_str()),
        ];
        let headers = [("token", token.expose())];

        let response: ForexQuotesResponse = self
            .http
            .get_json(&self.quotes_url(), &query, &headers)
            .await?;

        let quotes = self.normalize(response)?;
        if quotes.len() < self.settings.pairs.len() {
            tracing::debug!(
                requested = self.settings.pairs.len(),
                received = quotes.len(),
                "Some forex pairs missing from payload"
            );
        }
        Ok(quotes)
    }

    fn fallback(&self) -> Vec<ForexQuote> {
        fallback_forex_quotes()
    }
}
