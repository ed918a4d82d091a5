//! In-memory fetcher used by the refresh pipeline tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::errors::{FetchResult, ParseError, SourceError};
use crate::models::{EpgChannel, EpgProgramme, EpgSource, ParsedFeed};
use crate::sources::SourceFetcher;

pub(crate) enum FakeFeed {
    Ok(ParsedFeed),
    Status(u16),
    Broken,
}

#[derive(Default)]
pub(crate) struct FakeFetcher {
    feeds: HashMap<String, FakeFeed>,
    delay: Duration,
    delays: HashMap<String, Duration>,
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_feed(mut self, url: &str, feed: FakeFeed) -> Self {
        self.feeds.insert(url.to_string(), feed);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay for one URL, overriding the common delay
    pub(crate) fn with_feed_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Every fetch consumes one permit of `gate` before completing
    pub(crate) fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for FakeFetcher {
    async fn fetch(&self, source: &EpgSource) -> FetchResult<ParsedFeed> {
        self.calls.lock().unwrap().push(source.url.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(gate) = &self.gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }
        let delay = self.delays.get(&source.url).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.feeds.get(&source.url) {
            Some(FakeFeed::Ok(feed)) => Ok(feed.clone()),
            Some(FakeFeed::Status(status)) => Err(SourceError::Http {
                status: *status,
                url: source.url.clone(),
                message: "Not Found".to_string(),
            }),
            Some(FakeFeed::Broken) | None => {
                Err(SourceError::parse(source.url.clone(), ParseError::MissingRoot))
            }
        }
    }
}

/// A feed with one channel and one programme per id
pub(crate) fn feed_with_channels(ids: &[&str]) -> ParsedFeed {
    ParsedFeed {
        channels: ids
            .iter()
            .map(|id| EpgChannel {
                id: id.to_string(),
                ..Default::default()
            })
            .collect(),
        programmes: ids
            .iter()
            .map(|id| EpgProgramme {
                start: "20210423071700 +0000".to_string(),
                stop: "20210423081700 +0000".to_string(),
                channel: id.to_string(),
                title: format!("Show on {id}"),
                ..Default::default()
            })
            .collect(),
    }
}
