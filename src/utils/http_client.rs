use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{AppResult, FetchResult, SourceError};
use crate::utils::url::UrlUtils;
use crate::utils::{CompressionFormat, DecompressionService};

/// HTTP client for feed downloads with timeouts and automatic decompression
#[derive(Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Create a client with a total request timeout and a connection timeout
    pub fn new(
        request_timeout: Duration,
        connect_timeout: Duration,
        user_agent: &str,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &HttpConfig) -> AppResult<Self> {
        Self::new(config.request_timeout, config.connect_timeout, &config.user_agent)
    }

    /// Fetch URL and return decompressed text content
    ///
    /// Bodies that are not valid UTF-8 are decoded lossily rather than rejected.
    pub async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        debug!("Fetching text content from: {}", safe_url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, &safe_url))?;

        let bytes = Self::process_response_to_bytes(response, &safe_url).await?;

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                debug!("Content from {} is not valid UTF-8, decoding lossily", safe_url);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        debug!("Successfully fetched {} characters of text content", content.len());
        Ok(content)
    }

    /// Check status and read the body, decompressing it when needed
    async fn process_response_to_bytes(response: Response, safe_url: &str) -> FetchResult<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: safe_url.to_string(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::map_transport_error(e, safe_url))?;

        debug!("Fetched {} bytes of raw content", bytes.len());

        let compression_format = DecompressionService::detect_compression_format(&bytes);
        let decompressed_bytes = match compression_format {
            CompressionFormat::Uncompressed => bytes.to_vec(),
            _ => {
                debug!("Content is {:?} compressed, decompressing", compression_format);
                DecompressionService::decompress(bytes).map_err(|e| SourceError::Decompression {
                    url: safe_url.to_string(),
                    message: format!("{e:#}"),
                })?
            }
        };

        Ok(decompressed_bytes)
    }

    fn map_transport_error(error: reqwest::Error, safe_url: &str) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout {
                url: safe_url.to_string(),
            }
        } else {
            // The raw URL may carry credentials
            SourceError::transport(safe_url, error.without_url().to_string())
        }
    }
}
