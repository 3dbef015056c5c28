//! Background job scheduler and job implementations.

mod alert_worker;
mod history_record;
mod history_retention;
mod host_poll;
mod pool_metrics;
mod scheduler;

pub use alert_worker::{process_snapshot, spawn_alert_worker};
pub use history_record::HistoryRecordJob;
pub use history_retention::HistoryRetentionJob;
pub use host_poll::HostPollJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
