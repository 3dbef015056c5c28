//! User account entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Role;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
    pub role: String,
    pub is_master: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            login: entity.login,
            password_hash: entity.password_hash,
            role: Role::from_str(&entity.role).unwrap_or(Role::User),
            is_master: entity.is_master,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
