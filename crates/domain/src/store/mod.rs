//! Storage contracts.
//!
//! Services depend on these traits so they can run against PostgreSQL in
//! production and against the in-memory stores in tests or the `memory`
//! backend.

pub mod memory;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Device, DeviceInput, NewUser, StatusSample, User};

pub use memory::{InMemoryDeviceStore, InMemoryHistoryStore, InMemoryUserStore};

/// Field guarded by a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Ip,
    Name,
    Login,
}

/// Errors reported by storage implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),

    #[error("{0}")]
    Unavailable(String),
}

/// Device registry storage.
#[async_trait::async_trait]
pub trait DeviceStore: Send + Sync {
    /// All devices ordered by `order` then creation time.
    async fn list(&self) -> Result<Vec<Device>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, StoreError>;

    async fn find_by_ip(&self, ip: &str) -> Result<Option<Device>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Device>, StoreError>;

    /// Inserts a device, assigning its id and `order = max(order) + 1`.
    async fn insert(&self, input: &DeviceInput) -> Result<Device, StoreError>;

    /// Returns `None` when no device has this id.
    async fn update(&self, id: Uuid, input: &DeviceInput) -> Result<Option<Device>, StoreError>;

    /// Returns `false` when no device has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns `false` when no device has this id.
    async fn set_order(&self, id: Uuid, order: i32) -> Result<bool, StoreError>;

    /// Cheap connectivity check used by health probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Append-only status history storage.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, samples: &[StatusSample]) -> Result<u64, StoreError>;

    /// Samples for `ip` at or after `since`, ascending by datetime.
    async fn find_since(&self, ip: &str, since: DateTime<Utc>)
        -> Result<Vec<StatusSample>, StoreError>;

    /// Most recent sample for `ip`.
    async fn find_latest(&self, ip: &str) -> Result<Option<StatusSample>, StoreError>;

    /// Deletes samples older than `cutoff`, returning the number removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// User account storage.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Users other than the master user, ordered by creation time.
    async fn list_regular(&self) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    async fn find_master(&self) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
