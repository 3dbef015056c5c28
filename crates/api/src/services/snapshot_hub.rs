//! Latest host snapshot, shared between the poller and its subscribers.

use domain::models::HostSnapshot;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Published snapshots buffered per stream subscriber before it lags.
pub const SNAPSHOT_BUFFER: usize = 64;

/// Reconciled snapshots: the latest one, plus an ordered stream of every
/// published one.
///
/// Snapshots carry a sequence number taken before the fetch started; a
/// snapshot older than the current one is dropped so a slow response can
/// never overwrite a newer view.
#[derive(Debug)]
pub struct SnapshotHub {
    tx: watch::Sender<Arc<HostSnapshot>>,
    stream: broadcast::Sender<Arc<HostSnapshot>>,
    sequence: AtomicU64,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::with_buffer(SNAPSHOT_BUFFER)
    }

    pub fn with_buffer(buffer: usize) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(HostSnapshot::empty()));
        let (stream, _) = broadcast::channel(buffer.max(1));
        Self {
            tx,
            stream,
            sequence: AtomicU64::new(0),
        }
    }

    /// Reserves the sequence number for the next cycle.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publishes `snapshot` unless a newer one is already current.
    /// Returns whether it was published.
    pub fn publish(&self, snapshot: HostSnapshot) -> bool {
        self.tx.send_if_modified(|current| {
            if snapshot.sequence > current.sequence {
                let snapshot = Arc::new(snapshot);
                // Sent under the watch lock so stream order matches sequence order.
                // Err only means nobody is subscribed.
                let _ = self.stream.send(Arc::clone(&snapshot));
                *current = snapshot;
                true
            } else {
                false
            }
        })
    }

    pub fn latest(&self) -> Arc<HostSnapshot> {
        self.tx.borrow().clone()
    }

    /// Every snapshot published after this call, in order. A receiver that
    /// falls more than the buffer behind gets `RecvError::Lagged`.
    pub fn stream(&self) -> broadcast::Receiver<Arc<HostSnapshot>> {
        self.stream.subscribe()
    }
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}
