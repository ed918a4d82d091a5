//! Data model shared by the ingestion pipeline and the query side

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One row of the source registry: a country and the feed that covers it.
///
/// Several countries may share the same `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgSource {
    pub country: String,
    /// Lowercase ISO-2 code
    pub country_code: String,
    pub url: String,
}

impl EpgSource {
    pub fn new<C: Into<String>, K: Into<String>, U: Into<String>>(
        country: C,
        country_code: K,
        url: U,
    ) -> Self {
        Self {
            country: country.into(),
            country_code: country_code.into(),
            url: url.into(),
        }
    }
}

/// A `<channel>` element of a feed.
///
/// `id` is unique within one feed only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgChannel {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Remaining attributes of the element, copied verbatim
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

/// A `<programme>` element of a feed.
///
/// `start` and `stop` are kept in the raw XMLTV form (`YYYYMMDDHHMMSS +ZZZZ`);
/// use [`crate::utils::time::parse_xmltv_timestamp`] to convert them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgProgramme {
    pub start: String,
    pub stop: String,
    pub channel: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Remaining attributes of the element, copied verbatim
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

/// Channels and programmes parsed out of one feed document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub channels: Vec<EpgChannel>,
    pub programmes: Vec<EpgProgramme>,
}

/// The parsed output of one fetched feed, annotated with every country code
/// whose registry entry points at the fetched URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceResult {
    pub url: String,
    pub channels: Vec<EpgChannel>,
    pub programmes: Vec<EpgProgramme>,
    pub related_country_codes: BTreeSet<String>,
}

impl SourceResult {
    pub fn from_feed(
        url: impl Into<String>,
        feed: ParsedFeed,
        related_country_codes: BTreeSet<String>,
    ) -> Self {
        Self {
            url: url.into(),
            channels: feed.channels,
            programmes: feed.programmes,
            related_country_codes,
        }
    }

    pub fn covers_country(&self, country_code: &str) -> bool {
        self.related_country_codes.contains(country_code)
    }

    pub fn has_programmes_for(&self, channel_id: &str) -> bool {
        self.programmes.iter().any(|p| p.channel == channel_id)
    }
}

/// The merged, immutable result of one refresh cycle.
///
/// `generation` and `published_at` are stamped by the
/// [`SnapshotStore`](crate::store::SnapshotStore) when the snapshot is
/// published; an unpublished snapshot has generation 0.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub published_at: DateTime<Utc>,
    pub results: Vec<SourceResult>,
}

impl Snapshot {
    pub fn new(results: Vec<SourceResult>) -> Self {
        Self {
            generation: 0,
            published_at: Utc::now(),
            results,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn stamped(mut self, generation: u64) -> Self {
        self.generation = generation;
        self.published_at = Utc::now();
        self
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A programme converted for display: absolute times and consumer field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideEntry {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl GuideEntry {
    /// Running at `now`, or starting no later than `until`
    pub fn overlaps(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        self.stop >= now && self.start <= until
    }
}
