//! Background job enforcing the status history TTL.

use chrono::{Duration, Utc};
use domain::store::HistoryStore;
use std::sync::Arc;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Deletes samples older than the retention window, hourly.
pub struct HistoryRetentionJob {
    history: Arc<dyn HistoryStore>,
    retention_days: u32,
}

impl HistoryRetentionJob {
    pub fn new(history: Arc<dyn HistoryStore>, retention_days: u32) -> Self {
        Self {
            history,
            retention_days,
        }
    }

    pub async fn purge(&self) -> Result<u64, String> {
        let cutoff = Utc::now() - Duration::days(i64::from(self.retention_days));
        self.history
            .delete_older_than(cutoff)
            .await
            .map_err(|e| format!("Failed to delete expired samples: {}", e))
    }
}

#[async_trait::async_trait]
impl Job for HistoryRetentionJob {
    fn name(&self) -> &'static str {
        "history_retention"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let deleted = self.purge().await?;
        if deleted > 0 {
            info!(
                deleted = deleted,
                retention_days = self.retention_days,
                "Expired status samples deleted"
            );
        }
        Ok(())
    }
}
