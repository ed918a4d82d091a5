//! Utility modules for the EPG aggregator
//!
//! This module contains reusable utilities used by the ingestion
//! pipeline and the query side.

pub mod decompression;
pub mod http_client;
pub mod time;
pub mod url;
pub mod xmltv_parser;

// Re-export commonly used types for convenience
pub use decompression::{CompressionFormat, DecompressionService};
pub use http_client::StandardHttpClient;
