//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// Point-in-time connection counts of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
}

impl PoolStats {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle() as u32,
        }
    }

    /// Connections currently checked out.
    pub fn in_use(&self) -> u32 {
        self.size.saturating_sub(self.idle)
    }

    pub fn record(&self) {
        gauge!("hostwatch_db_connections_active").set(self.in_use() as f64);
        gauge!("hostwatch_db_connections_idle").set(self.idle as f64);
        gauge!("hostwatch_db_connections_total").set(self.size as f64);
    }
}

/// Publishes pool gauges and checks that the database answers.
///
/// Returns the round-trip time of the check query.
pub async fn sample_pool(pool: &PgPool) -> Result<Duration, sqlx::Error> {
    PoolStats::of(pool).record();

    let start = Instant::now();
    sqlx::query("SELECT 1").execute(pool).await?;
    let elapsed = start.elapsed();

    histogram!("hostwatch_db_ping_seconds").record(elapsed.as_secs_f64());
    Ok(elapsed)
}

/// Times a repository query until [`QueryTimer::record`] is called.
///
/// Dropping the timer without recording discards the sample.
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        histogram!("hostwatch_db_query_duration_seconds", "query" => self.query)
            .record(self.start.elapsed().as_secs_f64());
    }
}
