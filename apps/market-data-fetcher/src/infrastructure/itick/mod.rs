//! iTick Forex Adapter
//!
//! Implements [`MarketDataSource`](crate::application::ports::MarketDataSource)
//! for a fixed list of currency pairs via `/forex/quotes`. Requires an API
//! token, sent in the `token` header.

mod api_types;
mod source;

pub use source::ITickSource;
