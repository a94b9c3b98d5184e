//! Domain Layer - Quote records, formatting, and feed state.
//!
//! Pure types with no I/O. Everything here can be built and tested without
//! a runtime or network.

/// Per-category feed state machine.
pub mod feed;

/// Display formatting for prices, percentages and volumes.
pub mod format;

/// Display records for crypto, forex and equity quotes.
pub mod quotes;
