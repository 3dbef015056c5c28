//! In-memory store implementations.
//!
//! Each store keeps its rows behind a single `RwLock`, so uniqueness checks
//! and inserts happen under one write guard and concurrent creates cannot
//! both pass.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DeviceStore, HistoryStore, StoreError, UniqueField, UserStore};
use crate::models::{Device, DeviceInput, NewUser, StatusSample, User};

/// Device registry kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDeviceStore {
    devices: RwLock<Vec<Device>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing rows (ids and orders kept as given).
    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self {
            devices: RwLock::new(devices),
        }
    }
}

fn check_device_conflicts(
    devices: &[Device],
    input: &DeviceInput,
    exclude: Option<Uuid>,
) -> Result<(), StoreError> {
    let others = devices.iter().filter(|d| Some(d.id) != exclude);
    for device in others {
        if device.ip == input.ip {
            return Err(StoreError::UniqueViolation(UniqueField::Ip));
        }
        if device.name == input.name {
            return Err(StoreError::UniqueViolation(UniqueField::Name));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn list(&self) -> Result<Vec<Device>, StoreError> {
        let mut devices = self.devices.read().await.clone();
        devices.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(devices)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        Ok(self.devices.read().await.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_ip(&self, ip: &str) -> Result<Option<Device>, StoreError> {
        Ok(self.devices.read().await.iter().find(|d| d.ip == ip).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Device>, StoreError> {
        Ok(self
            .devices
            .read()
            .await
            .iter()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn insert(&self, input: &DeviceInput) -> Result<Device, StoreError> {
        let mut devices = self.devices.write().await;
        check_device_conflicts(&devices, input, None)?;

        let now = Utc::now();
        let device = Device {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            ip: input.ip.clone(),
            category: input.category,
            active: input.active,
            order: devices.iter().map(|d| d.order).max().unwrap_or(0) + 1,
            created_at: now,
            updated_at: now,
        };
        devices.push(device.clone());
        Ok(device)
    }

    async fn update(&self, id: Uuid, input: &DeviceInput) -> Result<Option<Device>, StoreError> {
        let mut devices = self.devices.write().await;
        if !devices.iter().any(|d| d.id == id) {
            return Ok(None);
        }
        check_device_conflicts(&devices, input, Some(id))?;

        let device = devices.iter_mut().find(|d| d.id == id);
        Ok(device.map(|device| {
            device.name = input.name.clone();
            device.ip = input.ip.clone();
            device.category = input.category;
            device.active = input.active;
            device.updated_at = Utc::now();
            device.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut devices = self.devices.write().await;
        let before = devices.len();
        devices.retain(|d| d.id != id);
        Ok(devices.len() != before)
    }

    async fn set_order(&self, id: Uuid, order: i32) -> Result<bool, StoreError> {
        let mut devices = self.devices.write().await;
        match devices.iter_mut().find(|d| d.id == id) {
            Some(device) => {
                device.order = order;
                device.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Status history kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    samples: RwLock<Vec<StatusSample>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.samples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.samples.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, samples: &[StatusSample]) -> Result<u64, StoreError> {
        self.samples.write().await.extend_from_slice(samples);
        Ok(samples.len() as u64)
    }

    async fn find_since(
        &self,
        ip: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StatusSample>, StoreError> {
        let mut found: Vec<StatusSample> = self
            .samples
            .read()
            .await
            .iter()
            .filter(|s| s.ip == ip && s.datetime >= since)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.datetime);
        Ok(found)
    }

    async fn find_latest(&self, ip: &str) -> Result<Option<StatusSample>, StoreError> {
        Ok(self
            .samples
            .read()
            .await
            .iter()
            .filter(|s| s.ip == ip)
            .max_by_key(|s| s.datetime)
            .cloned())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut samples = self.samples.write().await;
        let before = samples.len();
        samples.retain(|s| s.datetime >= cutoff);
        Ok((before - samples.len()) as u64)
    }
}

/// User accounts kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn list_regular(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .iter()
            .filter(|u| !u.is_master)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn find_master(&self) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.is_master).cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.login == user.login) {
            return Err(StoreError::UniqueViolation(UniqueField::Login));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            login: user.login.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            is_master: user.is_master,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}
