//! User repository for database operations.

use chrono::Utc;
use domain::models::{NewUser, User};
use domain::store::{StoreError, UserStore};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_store_error;
use crate::entities::UserEntity;

/// Repository for the users table.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl UserStore for UserRepository {
    async fn list_regular(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, login, password_hash, role, is_master, created_at, updated_at
            FROM users
            WHERE is_master = false
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, login, password_hash, role, is_master, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, login, password_hash, role, is_master, created_at, updated_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_master(&self) -> Result<Option<User>, StoreError> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, login, password_hash, role, is_master, created_at, updated_at
            FROM users
            WHERE is_master = true
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        let now = Utc::now();
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (id, login, password_hash, role, is_master, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, login, password_hash, role, is_master, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_master)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.into())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, login, password_hash, role, is_master, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(entity.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_store_error)?;
        Ok(result.rows_affected() > 0)
    }
}
