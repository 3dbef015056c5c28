//! Periodic database pool sampling.

use sqlx::PgPool;
use tracing::warn;

use super::scheduler::{Job, JobFrequency};

/// Round trips slower than this are logged.
const SLOW_PING_MS: u128 = 500;

/// Records the `hostwatch_db_connections_*` gauges and pings the database;
/// a failed ping fails the run. Only registered with the PostgreSQL backend.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(10)
    }

    async fn execute(&self) -> Result<(), String> {
        let elapsed = persistence::metrics::sample_pool(&self.pool)
            .await
            .map_err(|e| format!("Database ping failed: {}", e))?;

        if elapsed.as_millis() > SLOW_PING_MS {
            warn!(elapsed_ms = elapsed.as_millis() as u64, "Slow database ping");
        }
        Ok(())
    }
}
