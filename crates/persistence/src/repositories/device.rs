//! Device repository for database operations.

use chrono::Utc;
use domain::models::{Device, DeviceInput};
use domain::store::{DeviceStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_store_error;
use crate::entities::DeviceEntity;
use crate::metrics::QueryTimer;

/// Repository for the devices table.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl DeviceStore for DeviceRepository {
    async fn list(&self) -> Result<Vec<Device>, StoreError> {
        let timer = QueryTimer::new("list_devices");
        let rows = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, name, ip, category, active, sort_order, created_at, updated_at
            FROM devices
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_error);
        timer.record();

        Ok(rows?.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        let entity = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, name, ip, category, active, sort_order, created_at, updated_at
            FROM devices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_by_ip(&self, ip: &str) -> Result<Option<Device>, StoreError> {
        let entity = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, name, ip, category, active, sort_order, created_at, updated_at
            FROM devices
            WHERE ip = $1
            "#,
        )
        .bind(ip)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Device>, StoreError> {
        let entity = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, name, ip, category, active, sort_order, created_at, updated_at
            FROM devices
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn insert(&self, input: &DeviceInput) -> Result<Device, StoreError> {
        let now = Utc::now();
        let entity = sqlx::query_as::<_, DeviceEntity>(
            r#"
            INSERT INTO devices (id, name, ip, category, active, sort_order, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM devices), $6, $6)
            RETURNING id, name, ip, category, active, sort_order, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.ip)
        .bind(input.category.as_str())
        .bind(input.active)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.into())
    }

    async fn update(&self, id: Uuid, input: &DeviceInput) -> Result<Option<Device>, StoreError> {
        let entity = sqlx::query_as::<_, DeviceEntity>(
            r#"
            UPDATE devices
            SET name = $2, ip = $3, category = $4, active = $5, updated_at = $6
            WHERE id = $1
            RETURNING id, name, ip, category, active, sort_order, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.ip)
        .bind(input.category.as_str())
        .bind(input.active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_order(&self, id: Uuid, order: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE devices
            SET sort_order = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(order)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_store_error)?;
        Ok(())
    }
}
