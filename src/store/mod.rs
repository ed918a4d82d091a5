//! Holder of the most recently published [`Snapshot`].
//!
//! Backed by a `tokio::sync::watch` channel: publishing swaps the whole
//! `Arc<Snapshot>` in one step, so readers either see the previous snapshot or
//! the new one, never a mix. Until the first publish, [`SnapshotStore::current`]
//! waits instead of handing out an empty snapshot.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::Snapshot;

pub type SnapshotReceiver = watch::Receiver<Option<Arc<Snapshot>>>;

pub struct SnapshotStore {
    tx: watch::Sender<Option<Arc<Snapshot>>>,
    /// Last assigned generation; held while stamping and sending
    generation: Mutex<u64>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            generation: Mutex::new(0),
        }
    }

    /// Replace the current snapshot, waking every reader waiting for the first one
    ///
    /// Generations only ever increase in the order readers observe them.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let mut last = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        let generation = *last + 1;
        let snapshot = Arc::new(snapshot.stamped(generation));

        self.tx.send_replace(Some(Arc::clone(&snapshot)));
        *last = generation;
        drop(last);

        debug!(
            "Published snapshot generation {} with {} sources",
            generation,
            snapshot.len()
        );
        snapshot
    }

    /// The latest published snapshot, waiting for the first publish if needed
    pub async fn current(&self) -> Arc<Snapshot> {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(snapshot) = rx.borrow_and_update().as_ref() {
                return Arc::clone(snapshot);
            }
            if rx.changed().await.is_err() {
                // Unreachable while `self` holds the sender
                warn!("Snapshot channel closed before the first publish");
                return Arc::new(Snapshot::empty());
            }
        }
    }

    /// The latest published snapshot, or `None` before the first publish
    pub fn try_current(&self) -> Option<Arc<Snapshot>> {
        self.tx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.tx.subscribe()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
