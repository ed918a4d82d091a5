use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub query: QueryConfig,
    /// Country → feed table. The built-in table is used when this is empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeds: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Time between refresh cycles. The first cycle runs at startup.
    #[serde(with = "duration", default = "default_refresh_interval")]
    pub interval: Duration,
    /// Upper bound on feeds fetched at the same time
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Skip a scheduled cycle while the previous one is still running
    #[serde(default = "default_single_flight")]
    pub single_flight: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total time allowed for one feed download
    #[serde(with = "duration", default = "default_request_timeout")]
    pub request_timeout: Duration,
    #[serde(with = "duration", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How far ahead of "now" the rendered guide reaches
    #[serde(with = "duration", default = "default_guide_lookahead")]
    pub guide_lookahead: Duration,
}

/// One row of the feed table as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Country name; emoji flags are allowed and stripped
    pub country: String,
    pub url: String,
    /// Explicit ISO-2 code, bypassing the country name lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl FeedEntry {
    pub fn new<C: Into<String>, U: Into<String>>(country: C, url: U) -> Self {
        Self {
            country: country.into(),
            url: url.into(),
            country_code: None,
        }
    }
}

fn default_refresh_interval() -> Duration {
    DEFAULT_REFRESH_INTERVAL
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

fn default_single_flight() -> bool {
    DEFAULT_SINGLE_FLIGHT
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_guide_lookahead() -> Duration {
    DEFAULT_GUIDE_LOOKAHEAD
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: default_refresh_interval(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            single_flight: default_single_flight(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            guide_lookahead: default_guide_lookahead(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from_file(&config_file)
    }

    /// Load the config file, writing a default one when it does not exist
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.refresh.interval.is_zero() {
            return Err(AppError::configuration("refresh.interval must be greater than zero"));
        }
        if self.refresh.max_concurrent_fetches == 0 {
            return Err(AppError::configuration(
                "refresh.max_concurrent_fetches must be at least 1",
            ));
        }
        if self.http.request_timeout.is_zero() {
            return Err(AppError::configuration("http.request_timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.refresh.interval, Duration::from_secs(600));
        assert_eq!(config.refresh.max_concurrent_fetches, 2);
        assert!(config.refresh.single_flight);
        assert_eq!(config.query.guide_lookahead, Duration::from_secs(4 * 3600));
        assert!(config.http.user_agent.starts_with("epg-aggregator/"));
        assert!(config.feeds.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [refresh]
            interval = "30m"

            [[feeds]]
            country = "🇺🇸 United States"
            url = "https://iptv-org.github.io/epg/guides/tvtv.us.guide.xml"

            [[feeds]]
            country = "Kosovo"
            url = "https://example.com/kosovo.xml"
            country_code = "xk"
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh.interval, Duration::from_secs(1800));
        assert_eq!(config.refresh.max_concurrent_fetches, 2);
        assert_eq!(config.http.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].country_code, None);
        assert_eq!(config.feeds[1].country_code.as_deref(), Some("xk"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.refresh.max_concurrent_fetches = 0;
        assert!(matches!(config.validate(), Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load_from_file(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.refresh.interval, DEFAULT_REFRESH_INTERVAL);

        let reloaded = Config::load_from_file(path_str).unwrap();
        assert_eq!(reloaded.refresh.interval, config.refresh.interval);
        assert_eq!(reloaded.http.request_timeout, config.http.request_timeout);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[refresh]\ninterval = \"never\"\n").unwrap();

        assert!(Config::load_from_file(path.to_str().unwrap()).is_err());
    }
}
