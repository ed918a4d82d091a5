pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod query;
pub mod registry;
pub mod sources;
pub mod store;
pub mod utils;
