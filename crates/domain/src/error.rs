//! Domain error types.

use shared::password::PasswordError;
use thiserror::Error;

use crate::store::{StoreError, UniqueField};

/// Errors produced by domain services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("A device with this IP already exists")]
    DuplicateIp,

    #[error("A device with this name already exists")]
    DuplicateName,

    #[error("Login already exists")]
    DuplicateLogin,

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("No devices configured")]
    NoDevicesConfigured,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn device_not_found() -> Self {
        DomainError::NotFound { entity: "Device" }
    }

    pub fn user_not_found() -> Self {
        DomainError::NotFound { entity: "User" }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueField::Ip) => DomainError::DuplicateIp,
            StoreError::UniqueViolation(UniqueField::Name) => DomainError::DuplicateName,
            StoreError::UniqueViolation(UniqueField::Login) => DomainError::DuplicateLogin,
            StoreError::Unavailable(msg) => DomainError::StorageUnavailable(msg),
        }
    }
}

impl From<PasswordError> for DomainError {
    fn from(err: PasswordError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .collect();
        messages.sort();

        DomainError::Validation(messages.join("; "))
    }
}
