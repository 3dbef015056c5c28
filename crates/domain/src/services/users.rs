//! User account service.

use shared::password::{hash_password, verify_password};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{NewUser, Role, User};
use crate::store::UserStore;

/// Account management and credential checks.
///
/// The master account is hidden from listings and cannot be edited or
/// deleted through this service.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// All accounts except the master user.
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.store.list_regular().await?)
    }

    pub async fn create(&self, login: &str, password: &str, role: Role) -> Result<User, DomainError> {
        let login = login.trim();
        if self.store.find_by_login(login).await?.is_some() {
            return Err(DomainError::DuplicateLogin);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .store
            .insert(&NewUser {
                login: login.to_string(),
                password_hash,
                role,
                is_master: false,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn update_password(&self, id: Uuid, password: &str) -> Result<User, DomainError> {
        let user = self.mutable_user(id, "edited").await?;

        let password_hash = hash_password(password)?;
        let updated = self
            .store
            .update_password(user.id, &password_hash)
            .await?
            .ok_or_else(DomainError::user_not_found)?;

        tracing::info!(user_id = %id, "User password changed");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.mutable_user(id, "deleted").await?;

        if !self.store.delete(id).await? {
            return Err(DomainError::user_not_found());
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Checks a login/password pair.
    ///
    /// Unknown logins and wrong passwords produce the same error.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .store
            .find_by_login(login.trim())
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(DomainError::InvalidCredentials),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                Err(DomainError::InvalidCredentials)
            }
        }
    }

    async fn mutable_user(&self, id: Uuid, action: &str) -> Result<User, DomainError> {
        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(DomainError::user_not_found)?;

        if user.is_master {
            return Err(DomainError::Forbidden(format!(
                "The master user cannot be {}",
                action
            )));
        }
        Ok(user)
    }
}
