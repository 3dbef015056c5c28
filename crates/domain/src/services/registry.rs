//! Device registry service.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Device, DeviceInput, DeviceOrder};
use crate::store::{DeviceStore, StoreError};

/// Outcome of a reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReorderOutcome {
    pub requested: usize,
    pub updated: usize,
    pub missing: usize,
}

/// CRUD and ordering over the device store.
///
/// Duplicate checks run before writes to give a precise error early; the
/// store's unique constraints still decide races.
#[derive(Clone)]
pub struct DeviceRegistry {
    store: Arc<dyn DeviceStore>,
}

impl DeviceRegistry {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DeviceStore> {
        &self.store
    }

    pub async fn list(&self) -> Result<Vec<Device>, DomainError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Device, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(DomainError::device_not_found)
    }

    pub async fn create(&self, input: DeviceInput) -> Result<Device, DomainError> {
        if self.store.find_by_ip(&input.ip).await?.is_some() {
            return Err(DomainError::DuplicateIp);
        }
        if self.store.find_by_name(&input.name).await?.is_some() {
            return Err(DomainError::DuplicateName);
        }

        let device = self.store.insert(&input).await?;
        tracing::info!(
            device_id = %device.id,
            ip = %device.ip,
            order = device.order,
            "Device created"
        );
        Ok(device)
    }

    pub async fn update(&self, id: Uuid, input: DeviceInput) -> Result<Device, DomainError> {
        if let Some(other) = self.store.find_by_ip(&input.ip).await? {
            if other.id != id {
                return Err(DomainError::DuplicateIp);
            }
        }
        if let Some(other) = self.store.find_by_name(&input.name).await? {
            if other.id != id {
                return Err(DomainError::DuplicateName);
            }
        }

        let device = self
            .store
            .update(id, &input)
            .await?
            .ok_or_else(DomainError::device_not_found)?;
        tracing::info!(device_id = %device.id, active = device.active, "Device updated");
        Ok(device)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.store.delete(id).await? {
            return Err(DomainError::device_not_found());
        }
        tracing::info!(device_id = %id, "Device deleted");
        Ok(())
    }

    /// Applies each order update independently.
    ///
    /// Unknown ids are counted and skipped. Every item is attempted even when
    /// an earlier one hits a storage error; the first such error is returned
    /// once the batch has been walked.
    pub async fn reorder(&self, orders: &[DeviceOrder]) -> Result<ReorderOutcome, DomainError> {
        let mut outcome = ReorderOutcome {
            requested: orders.len(),
            ..ReorderOutcome::default()
        };
        let mut first_error: Option<StoreError> = None;

        for item in orders {
            match self.store.set_order(item.id, item.order).await {
                Ok(true) => outcome.updated += 1,
                Ok(false) => {
                    tracing::debug!(device_id = %item.id, "Reorder skipped unknown device");
                    outcome.missing += 1;
                }
                Err(e) => {
                    tracing::error!(device_id = %item.id, error = %e, "Reorder update failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e.into());
        }

        tracing::info!(
            requested = outcome.requested,
            updated = outcome.updated,
            missing = outcome.missing,
            "Devices reordered"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceCategory;
    use crate::store::InMemoryDeviceStore;

    fn registry() -> DeviceRegistry {
        DeviceRegistry::new(Arc::new(InMemoryDeviceStore::new()))
    }

    fn input(name: &str, ip: &str) -> DeviceInput {
        DeviceInput {
            name: name.into(),
            ip: ip.into(),
            category: DeviceCategory::Pessoal,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_next_order() {
        let registry = registry();
        let first = registry.create(input("a", "10.0.0.1")).await.unwrap();
        registry.reorder(&[DeviceOrder { id: first.id, order: 7 }]).await.unwrap();

        let second = registry.create(input("b", "10.0.0.2")).await.unwrap();
        assert_eq!(first.order, 1);
        assert_eq!(second.order, 8);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let registry = registry();
        registry.create(input("a", "10.0.0.1")).await.unwrap();

        assert!(matches!(
            registry.create(input("b", "10.0.0.1")).await,
            Err(DomainError::DuplicateIp)
        ));
        assert!(matches!(
            registry.create(input("a", "10.0.0.2")).await,
            Err(DomainError::DuplicateName)
        ));
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_checks_other_devices_only() {
        let registry = registry();
        let a = registry.create(input("a", "10.0.0.1")).await.unwrap();
        registry.create(input("b", "10.0.0.2")).await.unwrap();

        let renamed = registry.update(a.id, input("a2", "10.0.0.1")).await.unwrap();
        assert_eq!(renamed.name, "a2");
        assert_eq!(renamed.order, a.order);

        assert!(matches!(
            registry.update(a.id, input("a2", "10.0.0.2")).await,
            Err(DomainError::DuplicateIp)
        ));
        assert!(matches!(
            registry.update(Uuid::new_v4(), input("z", "10.0.0.9")).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_device() {
        let registry = registry();
        let a = registry.create(input("a", "10.0.0.1")).await.unwrap();

        tokio_test::assert_ok!(registry.delete(a.id).await);
        assert!(matches!(
            registry.delete(a.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reorder_skips_missing_ids() {
        let registry = registry();
        let a = registry.create(input("a", "10.0.0.1")).await.unwrap();
        let b = registry.create(input("b", "10.0.0.2")).await.unwrap();

        let outcome = registry
            .reorder(&[
                DeviceOrder { id: b.id, order: 1 },
                DeviceOrder { id: Uuid::new_v4(), order: 2 },
                DeviceOrder { id: a.id, order: 3 },
            ])
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReorderOutcome {
                requested: 3,
                updated: 2,
                missing: 1
            }
        );
        let names: Vec<String> = registry.list().await.unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
