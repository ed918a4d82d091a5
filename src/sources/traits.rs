//! Source fetcher trait definition

use async_trait::async_trait;

use crate::errors::FetchResult;
use crate::models::{EpgSource, ParsedFeed};

/// Retrieves and parses one feed.
///
/// Implementations report failures through the returned error and must not
/// panic; a failed feed is simply left out of the snapshot by the caller.
/// No retries happen within one call.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &EpgSource) -> FetchResult<ParsedFeed>;
}
