//! Master user bootstrap.
//!
//! Creates the master admin account on startup from `auth.master_login` and
//! `auth.master_password`. Idempotent: nothing happens once a master exists.

use domain::models::{NewUser, Role};
use domain::store::{StoreError, UserStore};
use shared::password::{hash_password, PasswordError};
use tracing::{info, warn};

use crate::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// What the bootstrap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyPresent,
    Skipped,
}

pub async fn bootstrap_master(
    users: &dyn UserStore,
    config: &AuthConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if users.find_master().await?.is_some() {
        info!("Master user already exists - skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let login = config.master_login.trim();
    if login.is_empty() || config.master_password.is_empty() {
        warn!("No master user configured; set HW__AUTH__MASTER_PASSWORD to create one");
        return Ok(BootstrapOutcome::Skipped);
    }

    let password_hash = hash_password(&config.master_password)?;
    let user = users
        .insert(&NewUser {
            login: login.to_string(),
            password_hash,
            role: Role::Admin,
            is_master: true,
        })
        .await?;

    info!(login = %user.login, user_id = %user.id, "Master user created");
    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::store::InMemoryUserStore;
    use shared::password::verify_password;

    fn auth_config(login: &str, password: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: "secret".to_string(),
            token_expiry_secs: 3600,
            master_login: login.to_string(),
            master_password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_creates_master_once() {
        let store = InMemoryUserStore::new();
        let config = auth_config("admin", "s3cret!");

        let first = bootstrap_master(&store, &config).await.unwrap();
        let second = bootstrap_master(&store, &config).await.unwrap();

        assert_eq!(first, BootstrapOutcome::Created);
        assert_eq!(second, BootstrapOutcome::AlreadyPresent);

        let master = store.find_master().await.unwrap().unwrap();
        assert_eq!(master.login, "admin");
        assert_eq!(master.role, Role::Admin);
        assert!(verify_password("s3cret!", &master.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_skips_without_password() {
        let store = InMemoryUserStore::new();
        let outcome = bootstrap_master(&store, &auth_config("admin", ""))
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::Skipped);
        assert!(store.find_master().await.unwrap().is_none());
    }
}
