//! Device domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_ipv4, validate_not_blank};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Display category for a monitored device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    Empresas,
    Pessoal,
    Teste,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Empresas => "Empresas",
            DeviceCategory::Pessoal => "Pessoal",
            DeviceCategory::Teste => "Teste",
        }
    }
}

impl FromStr for DeviceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Empresas" => Ok(DeviceCategory::Empresas),
            "Pessoal" => Ok(DeviceCategory::Pessoal),
            "Teste" => Ok(DeviceCategory::Teste),
            _ => Err(format!("Invalid device category: {}", s)),
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monitored network endpoint from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub ip: String,
    pub category: DeviceCategory,
    pub active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized, validated fields for creating or updating a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInput {
    pub name: String,
    pub ip: String,
    pub category: DeviceCategory,
    pub active: bool,
}

/// Request payload for creating or updating a device.
///
/// Missing `name`/`ip` deserialize as empty strings so they surface as
/// validation messages rather than body rejections.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertDeviceRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_ipv4"))]
    pub ip: String,

    #[validate(required(message = "Category is required"))]
    pub category: Option<DeviceCategory>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl UpsertDeviceRequest {
    /// Converts an already validated request into trimmed input.
    ///
    /// Returns `None` when the category is missing; callers validate first.
    pub fn into_input(self) -> Option<DeviceInput> {
        Some(DeviceInput {
            name: self.name.trim().to_string(),
            ip: self.ip.trim().to_string(),
            category: self.category?,
            active: self.active,
        })
    }
}

/// One entry of a manual reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOrder {
    pub id: Uuid,
    pub order: i32,
}
