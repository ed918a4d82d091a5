//! Read side: channel and programme lookups against the current snapshot.
//!
//! Every call takes one snapshot handle up front and answers entirely from
//! it, so a publish in the middle of a query never mixes two snapshots.
//! Lookups that find nothing return empty results rather than errors.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::QueryConfig;
use crate::models::{EpgChannel, EpgProgramme, GuideEntry, Snapshot, SourceResult};
use crate::store::SnapshotStore;
use crate::utils::time::parse_xmltv_timestamp;

/// Country code implied by a channel id: the text after its last `.`.
///
/// `"abc.us"` gives `Some("us")`; ids without a dot, or ending in one, give
/// `None`.
pub fn channel_country_code(channel_id: &str) -> Option<&str> {
    channel_id
        .rsplit_once('.')
        .map(|(_, suffix)| suffix)
        .filter(|suffix| !suffix.is_empty())
}

/// Pick the result that answers for `channel_id`: the first one related to
/// the id's country code, otherwise the first one carrying a programme for
/// the id.
pub fn resolve_source<'a>(snapshot: &'a Snapshot, channel_id: &str) -> Option<&'a SourceResult> {
    if let Some(country_code) = channel_country_code(channel_id)
        && let Some(result) = snapshot
            .results
            .iter()
            .find(|r| r.covers_country(country_code))
    {
        return Some(result);
    }

    snapshot
        .results
        .iter()
        .find(|r| r.has_programmes_for(channel_id))
}

#[derive(Clone)]
pub struct QueryResolver {
    store: Arc<SnapshotStore>,
    guide_lookahead: Duration,
}

impl QueryResolver {
    pub fn new(store: Arc<SnapshotStore>, config: &QueryConfig) -> Self {
        Self {
            store,
            guide_lookahead: config.guide_lookahead,
        }
    }

    /// Channels across all feeds, first occurrence of each id winning.
    ///
    /// With `ids`, only channels whose id is listed are returned.
    pub async fn get_channels(&self, ids: Option<&[String]>) -> Vec<EpgChannel> {
        let snapshot = self.store.current().await;
        let wanted: Option<HashSet<&str>> = ids.map(|ids| ids.iter().map(String::as_str).collect());
        let mut seen = HashSet::new();

        snapshot
            .results
            .iter()
            .flat_map(|result| result.channels.iter())
            .filter(|channel| seen.insert(channel.id.as_str()))
            .filter(|channel| {
                wanted
                    .as_ref()
                    .is_none_or(|wanted| wanted.contains(channel.id.as_str()))
            })
            .cloned()
            .collect()
    }

    /// Programmes of one channel, in feed order, from the resolved feed only
    pub async fn get_programmes(&self, channel_id: &str) -> Vec<EpgProgramme> {
        let snapshot = self.store.current().await;
        programmes_in(&snapshot, channel_id)
    }

    /// Programmes running at `now` or starting within the guide lookahead,
    /// with timestamps converted.
    pub async fn get_guide(&self, channel_id: &str, now: DateTime<Utc>) -> Vec<GuideEntry> {
        let until = now
            + chrono::Duration::from_std(self.guide_lookahead)
                .unwrap_or_else(|_| chrono::Duration::hours(4));

        self.get_programmes(channel_id)
            .await
            .into_iter()
            .map(|programme| GuideEntry {
                start: parse_xmltv_timestamp(&programme.start),
                stop: parse_xmltv_timestamp(&programme.stop),
                name: programme.title,
                description: programme.desc,
                poster: programme.icon,
            })
            .filter(|entry| entry.overlaps(now, until))
            .collect()
    }

    /// `id → icon` for the requested channels that have one
    pub async fn get_channel_icons(&self, ids: &[String]) -> HashMap<String, String> {
        self.get_channels(Some(ids))
            .await
            .into_iter()
            .filter_map(|channel| channel.icon.map(|icon| (channel.id, icon)))
            .collect()
    }
}

fn programmes_in(snapshot: &Snapshot, channel_id: &str) -> Vec<EpgProgramme> {
    let Some(result) = resolve_source(snapshot, channel_id) else {
        debug!("No EPG source resolves channel {}", channel_id);
        return Vec::new();
    };

    result
        .programmes
        .iter()
        .filter(|p| p.channel == channel_id)
        .cloned()
        .collect()
}
