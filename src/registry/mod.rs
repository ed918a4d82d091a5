//! Source registry: turns the configured country → feed table into the
//! ordered list of [`EpgSource`]s the refresh pipeline consumes.
//!
//! The list is built once at startup; an entry whose country cannot be
//! resolved is fatal.

use tracing::{debug, info};

use crate::config::{Config, FeedEntry};
use crate::errors::RegistryError;
use crate::models::EpgSource;
use crate::utils::url::UrlUtils;

pub mod countries;
pub mod defaults;

pub use countries::lookup_country_code;

/// Strip emoji (flag symbols and the like) and collapse whitespace
pub fn clean_country_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '-' | '\'' | '.' | ','))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The built-in feed table as config entries
pub fn builtin_entries() -> Vec<FeedEntry> {
    defaults::BUILTIN_FEEDS
        .iter()
        .map(|(country, url)| FeedEntry::new(*country, *url))
        .collect()
}

/// Resolve every entry to an [`EpgSource`], preserving input order
pub fn build_sources(entries: &[FeedEntry]) -> Result<Vec<EpgSource>, RegistryError> {
    entries.iter().map(resolve_entry).collect()
}

/// Sources from the config file, or from the built-in table when it lists none
pub fn sources_from_config(config: &Config) -> Result<Vec<EpgSource>, RegistryError> {
    let sources = if config.feeds.is_empty() {
        debug!("No feeds configured, using built-in feed table");
        build_sources(&builtin_entries())?
    } else {
        build_sources(&config.feeds)?
    };

    info!("Source registry resolved {} countries", sources.len());
    Ok(sources)
}

fn resolve_entry(entry: &FeedEntry) -> Result<EpgSource, RegistryError> {
    let country = clean_country_name(&entry.country);

    let country_code = match entry.country_code.as_deref().map(str::trim) {
        Some(code) if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            code.to_ascii_lowercase()
        }
        Some(_) => {
            return Err(RegistryError::UnknownCountry {
                country: entry.country.clone(),
            });
        }
        None => lookup_country_code(&country)
            .map(str::to_string)
            .ok_or_else(|| RegistryError::UnknownCountry {
                country: entry.country.clone(),
            })?,
    };

    let url = UrlUtils::parse_feed_url(&entry.url).map_err(|message| RegistryError::InvalidUrl {
        url: entry.url.clone(),
        message,
    })?;

    Ok(EpgSource {
        country,
        country_code,
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_country_name() {
        assert_eq!(clean_country_name("🇺🇸 United States"), "United States");
        assert_eq!(clean_country_name("  🇨🇿  Czech   Republic "), "Czech Republic");
        assert_eq!(clean_country_name("Côte d'Ivoire"), "Côte d'Ivoire");
        assert_eq!(clean_country_name("📺"), "");
    }

    #[test]
    fn test_build_sources_resolves_codes() {
        let entries = vec![
            FeedEntry::new(
                "🇦🇷 Argentina",
                "https://iptv-org.github.io/epg/guides/mi.tv.guide.xml",
            ),
            FeedEntry::new(
                "🇧🇷 Brazil",
                "https://iptv-org.github.io/epg/guides/mi.tv.guide.xml",
            ),
            FeedEntry {
                country: "Kosovo".to_string(),
                url: "https://example.com/kosovo.xml".to_string(),
                country_code: Some("XK".to_string()),
            },
        ];

        let sources = build_sources(&entries).unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].country, "Argentina");
        assert_eq!(sources[0].country_code, "ar");
        assert_eq!(sources[1].country_code, "br");
        assert_eq!(sources[0].url, sources[1].url);
        assert_eq!(sources[2].country_code, "xk");
    }

    #[test]
    fn test_unknown_country_is_fatal() {
        let entries = vec![
            FeedEntry::new("🇺🇸 United States", "https://example.com/us.xml"),
            FeedEntry::new("🏴 Atlantis", "https://example.com/atlantis.xml"),
        ];

        assert_eq!(
            build_sources(&entries),
            Err(RegistryError::UnknownCountry {
                country: "🏴 Atlantis".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_explicit_code() {
        let entries = vec![FeedEntry {
            country: "Nowhere".to_string(),
            url: "https://example.com/x.xml".to_string(),
            country_code: Some("xyz".to_string()),
        }];
        assert!(matches!(build_sources(&entries), Err(RegistryError::UnknownCountry { .. })));
    }

    #[test]
    fn test_invalid_url() {
        let entries = vec![FeedEntry::new("Germany", "guides/hd-plus.de.guide.xml")];
        assert!(matches!(build_sources(&entries), Err(RegistryError::InvalidUrl { .. })));
    }

    #[test]
    fn test_builtin_table_resolves() {
        let sources = build_sources(&builtin_entries()).unwrap();
        assert_eq!(sources.len(), defaults::BUILTIN_FEEDS.len());

        let mi_tv: Vec<_> = sources
            .iter()
            .filter(|s| s.url.ends_with("mi.tv.guide.xml"))
            .map(|s| s.country_code.as_str())
            .collect();
        assert!(mi_tv.contains(&"mx"));
        assert!(mi_tv.contains(&"ar"));
    }

    #[test]
    fn test_sources_from_config_falls_back_to_builtin() {
        let config = Config::default();
        let sources = sources_from_config(&config).unwrap();
        assert!(sources.iter().any(|s| s.country_code == "us"));
    }
}
