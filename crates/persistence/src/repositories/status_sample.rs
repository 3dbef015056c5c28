//! Status history repository.

use chrono::{DateTime, Utc};
use domain::models::StatusSample;
use domain::store::{HistoryStore, StoreError};
use sqlx::PgPool;

use super::map_store_error;
use crate::entities::StatusSampleEntity;
use crate::metrics::QueryTimer;

/// Rows removed per retention statement.
const DEFAULT_DELETE_BATCH: i64 = 10_000;

/// Repository for the status_samples table.
#[derive(Clone)]
pub struct HistoryRepository {
    pool: PgPool,
    delete_batch: i64,
}

impl HistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            delete_batch: DEFAULT_DELETE_BATCH,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl HistoryStore for HistoryRepository {
    async fn append(&self, samples: &[StatusSample]) -> Result<u64, StoreError> {
        if samples.is_empty() {
            return Ok(0);
        }

        let ips: Vec<&str> = samples.iter().map(|s| s.ip.as_str()).collect();
        let names: Vec<&str> = samples.iter().map(|s| s.name.as_str()).collect();
        let statuses: Vec<&str> = samples.iter().map(|s| s.status.as_str()).collect();
        let datetimes: Vec<DateTime<Utc>> = samples.iter().map(|s| s.datetime).collect();
        let response_times: Vec<Option<f64>> = samples.iter().map(|s| s.response_time).collect();

        let timer = QueryTimer::new("append_status_samples");
        let result = sqlx::query(
            r#"
            INSERT INTO status_samples (ip, name, status, datetime, response_time)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::timestamptz[], $5::float8[])
            "#,
        )
        .bind(&ips)
        .bind(&names)
        .bind(&statuses)
        .bind(&datetimes)
        .bind(&response_times)
        .execute(&self.pool)
        .await
        .map_err(map_store_error);
        timer.record();

        Ok(result?.rows_affected())
    }

    async fn find_since(
        &self,
        ip: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StatusSample>, StoreError> {
        let timer = QueryTimer::new("find_status_samples_since");
        let rows = sqlx::query_as::<_, StatusSampleEntity>(
            r#"
            SELECT id, ip, name, status, datetime, response_time
            FROM status_samples
            WHERE ip = $1 AND datetime >= $2
            ORDER BY datetime ASC
            "#,
        )
        .bind(ip)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_error);
        timer.record();

        Ok(rows?.into_iter().map(Into::into).collect())
    }

    async fn find_latest(&self, ip: &str) -> Result<Option<StatusSample>, StoreError> {
        let entity = sqlx::query_as::<_, StatusSampleEntity>(
            r#"
            SELECT id, ip, name, status, datetime, response_time
            FROM status_samples
            WHERE ip = $1
            ORDER BY datetime DESC
            LIMIT 1
            "#,
        )
        .bind(ip)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    /// Deletes in batches to avoid long locks.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut total_deleted: u64 = 0;

        loop {
            let result = sqlx::query(
                r#"
                WITH to_delete AS (
                    SELECT id FROM status_samples
                    WHERE datetime < $1
                    LIMIT $2
                )
                DELETE FROM status_samples
                WHERE id IN (SELECT id FROM to_delete)
                "#,
            )
            .bind(cutoff)
            .bind(self.delete_batch)
            .execute(&self.pool)
            .await
            .map_err(map_store_error)?;

            let deleted = result.rows_affected();
            total_deleted += deleted;

            if deleted < self.delete_batch as u64 {
                break;
            }

            tokio::task::yield_now().await;
        }

        Ok(total_deleted)
    }
}
