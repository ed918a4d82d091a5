//! Centralized error handling for the EPG aggregator
//!
//! Errors are split by the layer they originate from:
//!
//! - **Source Errors**: a single feed could not be fetched or parsed. These are
//!   local to one feed and never abort a refresh cycle.
//! - **Parse Errors**: structurally invalid XMLTV documents.
//! - **Registry Errors**: the country → feed table could not be resolved. Only
//!   raised while building the source list at startup.
//!
//! # Usage
//!
//! ```rust
//! use epg_aggregator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("no feeds configured"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result of fetching a single feed
pub type FetchResult<T> = Result<T, SourceError>;

/// Result of parsing a single XMLTV document
pub type ParseResult<T> = Result<T, ParseError>;
