//! CoinGecko Crypto Adapter
//!
//! Implements [`MarketDataSource`](crate::application::ports::MarketDataSource)
//! for the top coins by market cap from the public `/coins/markets`
//! endpoint. No API key is needed.

mod api_types;
mod source;

pub use source::CoinGeckoSource;
