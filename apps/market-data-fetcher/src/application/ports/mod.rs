//! Port Interfaces
//!
//! ## Driven Ports (Outbound)
//!
//! - `MarketDataSource`: one upstream quote provider for one category

mod market_data_port;

pub use market_data_port::{FetchError, MarketDataSource};
