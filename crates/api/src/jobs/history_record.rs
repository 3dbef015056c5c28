//! Appends status samples from the latest snapshot.

use domain::services::samples_from_hosts;
use domain::store::HistoryStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_history_samples;
use crate::services::SnapshotHub;

/// Samples every non-disabled host of the latest snapshot.
///
/// Degraded snapshots are not recorded: with the status source down the
/// real state of the hosts is unknown. A snapshot is recorded at most once.
pub struct HistoryRecordJob {
    hub: Arc<SnapshotHub>,
    history: Arc<dyn HistoryStore>,
    interval_secs: u64,
    last_recorded: AtomicU64,
}

impl HistoryRecordJob {
    pub fn new(hub: Arc<SnapshotHub>, history: Arc<dyn HistoryStore>, interval_secs: u64) -> Self {
        Self {
            hub,
            history,
            interval_secs,
            last_recorded: AtomicU64::new(0),
        }
    }

    /// Returns the number of samples written.
    pub async fn record_latest(&self) -> Result<u64, String> {
        let snapshot = self.hub.latest();

        if snapshot.sequence == 0
            || snapshot.degraded
            || snapshot.sequence <= self.last_recorded.load(Ordering::SeqCst)
        {
            return Ok(0);
        }

        let samples = samples_from_hosts(&snapshot.hosts, snapshot.taken_at);
        let written = self
            .history
            .append(&samples)
            .await
            .map_err(|e| format!("Failed to append status samples: {}", e))?;

        self.last_recorded.store(snapshot.sequence, Ordering::SeqCst);
        record_history_samples(written);
        Ok(written)
    }
}

#[async_trait::async_trait]
impl Job for HistoryRecordJob {
    fn name(&self) -> &'static str {
        "history_record"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        let written = self.record_latest().await?;
        if written > 0 {
            tracing::debug!(samples = written, "Status samples recorded");
        }
        Ok(())
    }
}
