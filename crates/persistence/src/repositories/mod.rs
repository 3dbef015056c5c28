//! Repository implementations for database operations.
//!
//! Each repository implements one of the domain store traits on top of a
//! shared `PgPool`.

pub mod device;
pub mod status_sample;
pub mod user;

pub use device::DeviceRepository;
pub use status_sample::HistoryRepository;
pub use user::UserRepository;

use domain::store::{StoreError, UniqueField};

/// PostgreSQL error code for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx error onto the store error taxonomy.
///
/// Unique violations are resolved by constraint name so the caller can tell
/// which field collided; everything else is reported as unavailable.
pub(crate) fn map_store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            match db_err.constraint() {
                Some("devices_ip_key") => return StoreError::UniqueViolation(UniqueField::Ip),
                Some("devices_name_key") => {
                    return StoreError::UniqueViolation(UniqueField::Name)
                }
                Some("users_login_key") => {
                    return StoreError::UniqueViolation(UniqueField::Login)
                }
                _ => {}
            }
        }
    }

    tracing::error!(error = %err, "Database operation failed");
    StoreError::Unavailable(err.to_string())
}
