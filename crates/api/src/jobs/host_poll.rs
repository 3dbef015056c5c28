//! Fetch-reconcile cycle feeding the snapshot hub.

use chrono::Utc;
use domain::models::HostSnapshot;
use domain::services::{DeviceRegistry, HostReconciler};
use domain::DomainError;
use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_snapshot;
use crate::services::SnapshotHub;

/// Reconciles the registry against the status source and publishes the
/// result. An empty registry publishes an empty snapshot.
pub struct HostPollJob {
    registry: DeviceRegistry,
    reconciler: HostReconciler,
    hub: Arc<SnapshotHub>,
    interval_secs: u64,
}

impl HostPollJob {
    pub fn new(
        registry: DeviceRegistry,
        reconciler: HostReconciler,
        hub: Arc<SnapshotHub>,
        interval_secs: u64,
    ) -> Self {
        Self {
            registry,
            reconciler,
            hub,
            interval_secs,
        }
    }

    /// Runs one cycle and returns the snapshot it produced.
    pub async fn poll_once(&self) -> Result<HostSnapshot, DomainError> {
        let sequence = self.hub.next_sequence();
        let devices = self.registry.list().await?;

        let snapshot = match self.reconciler.reconcile(&devices).await {
            Ok(reconciliation) => HostSnapshot {
                sequence,
                hosts: reconciliation.hosts,
                degraded: reconciliation.degraded,
                taken_at: Utc::now(),
            },
            Err(DomainError::NoDevicesConfigured) => HostSnapshot {
                sequence,
                ..HostSnapshot::empty()
            },
            Err(e) => return Err(e),
        };

        record_snapshot(&snapshot);
        if !self.hub.publish(snapshot.clone()) {
            tracing::debug!(sequence, "Dropped stale snapshot");
        }
        Ok(snapshot)
    }
}

#[async_trait::async_trait]
impl Job for HostPollJob {
    fn name(&self) -> &'static str {
        "host_poll"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        self.poll_once().await.map(|_| ()).map_err(|e| e.to_string())
    }
}
