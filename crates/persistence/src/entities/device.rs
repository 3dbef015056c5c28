//! Device entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::DeviceCategory;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the devices table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub id: Uuid,
    pub name: String,
    pub ip: String,
    pub category: String,
    pub active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeviceEntity> for domain::models::Device {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            ip: entity.ip,
            // The column carries a CHECK constraint; the fallback is unreachable in practice.
            category: entity
                .category
                .parse::<DeviceCategory>()
                .unwrap_or(DeviceCategory::Teste),
            active: entity.active,
            order: entity.sort_order,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(category: &str) -> DeviceEntity {
        DeviceEntity {
            id: Uuid::new_v4(),
            name: "Core switch".to_string(),
            ip: "192.168.0.2".to_string(),
            category: category.to_string(),
            active: false,
            sort_order: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_device_entity_to_domain() {
        let entity = entity("Empresas");
        let device: domain::models::Device = entity.clone().into();

        assert_eq!(device.id, entity.id);
        assert_eq!(device.category, DeviceCategory::Empresas);
        assert_eq!(device.order, 4);
        assert!(!device.active);
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let device: domain::models::Device = entity("Casa").into();
        assert_eq!(device.category, DeviceCategory::Teste);
    }
}
