//! XMLTV feed fetcher
//!
//! Downloads a feed over HTTP, repairs bare ampersands and parses the
//! document with the streaming XMLTV parser.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::HttpConfig;
use crate::errors::{AppResult, FetchResult, SourceError};
use crate::models::{EpgSource, ParsedFeed};
use crate::sources::traits::SourceFetcher;
use crate::utils::StandardHttpClient;
use crate::utils::url::UrlUtils;
use crate::utils::xmltv_parser::{escape_bare_ampersands, parse_xmltv};

/// Fetches XMLTV feeds over HTTP
pub struct XmltvSourceFetcher {
    http_client: StandardHttpClient,
}

impl XmltvSourceFetcher {
    pub fn new(http_client: StandardHttpClient) -> Self {
        Self { http_client }
    }

    pub fn from_config(config: &HttpConfig) -> AppResult<Self> {
        Ok(Self::new(StandardHttpClient::from_config(config)?))
    }

    /// Sanitize and parse an already downloaded document
    pub fn parse_document(url: &str, content: &str) -> FetchResult<ParsedFeed> {
        let sanitized = escape_bare_ampersands(content);
        parse_xmltv(&sanitized)
            .map_err(|e| SourceError::parse(UrlUtils::obfuscate_credentials(url), e))
    }
}

#[async_trait]
impl SourceFetcher for XmltvSourceFetcher {
    async fn fetch(&self, source: &EpgSource) -> FetchResult<ParsedFeed> {
        debug!(
            "Fetching XMLTV feed for {} from {}",
            source.country,
            UrlUtils::obfuscate_credentials(&source.url)
        );

        let content = self.http_client.fetch_text(&source.url).await?;
        let feed = Self::parse_document(&source.url, &content)?;

        info!(
            "Parsed XMLTV feed {}: {} channels, {} programmes",
            UrlUtils::obfuscate_credentials(&source.url),
            feed.channels.len(),
            feed.programmes.len()
        );
        Ok(feed)
    }
}
