//! HTTP route handlers.

pub mod alerts;
pub mod auth;
pub mod device_status;
pub mod devices_config;
pub mod health;
pub mod hosts;
pub mod proxy_history;
pub mod users;

use domain::DomainError;
use uuid::Uuid;

use crate::error::ApiError;

/// Parses a path id; anything that is not a UUID cannot exist and maps to
/// the entity's not-found error.
pub(crate) fn parse_id(raw: &str, not_found: fn() -> DomainError) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found().into())
}
