//! One refresh cycle: group the source list by URL, fetch each feed once with
//! bounded concurrency, and publish the successful results as a new snapshot.
//!
//! A failed feed is logged and left out of the snapshot. The cycle itself
//! never fails.

use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::models::{EpgSource, Snapshot, SourceResult};
use crate::sources::SourceFetcher;
use crate::store::SnapshotStore;
use crate::utils::url::UrlUtils;

/// One distinct feed URL and every country code pointing at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedGroup {
    /// First registry entry seen for the URL
    pub source: EpgSource,
    pub related_country_codes: BTreeSet<String>,
}

/// Collapse registry entries sharing a URL, keeping first-seen order
pub fn group_sources_by_url(sources: &[EpgSource]) -> Vec<FeedGroup> {
    let mut groups: Vec<FeedGroup> = Vec::new();

    for source in sources {
        match groups.iter_mut().find(|g| g.source.url == source.url) {
            Some(group) => {
                group
                    .related_country_codes
                    .insert(source.country_code.clone());
            }
            None => groups.push(FeedGroup {
                source: source.clone(),
                related_country_codes: BTreeSet::from([source.country_code.clone()]),
            }),
        }
    }

    groups
}

/// Outcome counters of one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Distinct URLs attempted
    pub feeds: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

pub struct RefreshOrchestrator {
    fetcher: Arc<dyn SourceFetcher>,
    store: Arc<SnapshotStore>,
    max_concurrent_fetches: usize,
    refresh_lock: Mutex<()>,
}

impl RefreshOrchestrator {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        store: Arc<SnapshotStore>,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Whether a guarded refresh is currently running
    pub fn is_refreshing(&self) -> bool {
        self.refresh_lock.try_lock().is_err()
    }

    /// Run a full cycle and publish its snapshot.
    ///
    /// Waits for a guarded refresh that is already running, so snapshots are
    /// published in the order the cycles were requested.
    pub async fn refresh(&self, sources: &[EpgSource]) -> Arc<Snapshot> {
        let _guard = self.refresh_lock.lock().await;
        self.run_cycle(sources).await
    }

    /// Run a full cycle unless one is already running.
    ///
    /// Returns `None` when the cycle was skipped.
    pub async fn try_refresh(&self, sources: &[EpgSource]) -> Option<Arc<Snapshot>> {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            warn!("EPG refresh already in progress, skipping this cycle");
            return None;
        };
        Some(self.run_cycle(sources).await)
    }

    /// Run a full cycle without any guard; cycles may overlap and the last to
    /// finish wins.
    pub async fn refresh_concurrent(&self, sources: &[EpgSource]) -> Arc<Snapshot> {
        self.run_cycle(sources).await
    }

    /// Fetch every feed and build a snapshot without publishing it.
    ///
    /// Fetches complete in any order; results are listed in source order.
    pub async fn collect(&self, sources: &[EpgSource]) -> (Snapshot, RefreshReport) {
        let started = Instant::now();
        let groups = group_sources_by_url(sources);
        let feeds = groups.len();
        debug!(
            "Fetching {} feeds for {} sources, at most {} at a time",
            feeds,
            sources.len(),
            self.max_concurrent_fetches
        );

        let fetcher = &self.fetcher;
        let tagged = groups.into_iter().enumerate();
        let mut results: Vec<(usize, SourceResult)> = stream::iter(tagged)
            .map(|(index, group)| async move {
                let safe_url = UrlUtils::obfuscate_credentials(&group.source.url);
                match fetcher.fetch(&group.source).await {
                    Ok(feed) => Some((
                        index,
                        SourceResult::from_feed(
                            group.source.url,
                            feed,
                            group.related_country_codes,
                        ),
                    )),
                    Err(e) if e.is_http_status() => {
                        warn!(url = %safe_url, kind = e.kind(), "Response is not OK: {}", e);
                        None
                    }
                    Err(e) => {
                        error!(url = %safe_url, kind = e.kind(), "Failed to load feed: {}", e);
                        None
                    }
                }
            })
            .buffer_unordered(self.max_concurrent_fetches)
            .filter_map(|result| async move { result })
            .collect()
            .await;
        results.sort_unstable_by_key(|(index, _)| *index);
        let results: Vec<SourceResult> = results.into_iter().map(|(_, result)| result).collect();

        let report = RefreshReport {
            feeds,
            succeeded: results.len(),
            failed: feeds - results.len(),
            elapsed: started.elapsed(),
        };
        (Snapshot::new(results), report)
    }

    async fn run_cycle(&self, sources: &[EpgSource]) -> Arc<Snapshot> {
        let (snapshot, report) = self.collect(sources).await;
        let published = self.store.publish(snapshot);

        info!(
            "EPG updated. Sources parsed: {}/{} ({} failed) in {:?}, generation {}",
            report.succeeded,
            report.feeds,
            report.failed,
            report.elapsed,
            published.generation
        );
        published
    }
}
